//! `define_port_error!` builds the error enum of a driven port.
//!
//! Every variant is a struct variant with a `thiserror` message. A snake_case
//! constructor per variant takes `impl Into<_>` for each field, so adapters
//! write `BlobStoreError::missing_bucket(bucket)`.

macro_rules! define_port_error {
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident { $($field:ident : $ty:ty),+ $(,)? } => $message:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant {
                    $(
                        #[doc = concat!("`", stringify!($field), "` of the failure.")]
                        $field: $ty
                    ),+
                },
            )+
        }

        ::paste::paste! {
            impl $name {
                $(
                    #[doc = "Builds [`" $name "::" $variant "`]."]
                    #[must_use]
                    pub fn [<$variant:snake>]($($field: impl Into<$ty>),+) -> Self {
                        Self::$variant { $($field: $field.into()),+ }
                    }
                )+
            }
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    define_port_error! {
        /// Errors raised by the sample port.
        pub enum SampleError {
            /// Object is absent.
            Gone { location: String } => "object {location} does not exist",
            /// Bucket is rate limited.
            Throttled { bucket: String, retry_after_secs: u64 } =>
                "bucket {bucket} throttled, retry in {retry_after_secs}s",
        }
    }

    #[test]
    fn constructors_accept_borrowed_text() {
        let err = SampleError::gone("template/index.html");
        assert_eq!(err.to_string(), "object template/index.html does not exist");
    }

    #[test]
    fn non_text_fields_keep_their_types() {
        let err = SampleError::throttled("template", 3_u64);
        assert_eq!(
            err,
            SampleError::Throttled {
                bucket: "template".to_owned(),
                retry_after_secs: 3,
            }
        );
        assert_eq!(err.to_string(), "bucket template throttled, retry in 3s");
    }
}
