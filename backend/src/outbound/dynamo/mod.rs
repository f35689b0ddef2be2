//! DynamoDB-backed tenant record store.
//!
//! One item per tenant keyed by numeric `clientId`. Section writes address a
//! single document path (`environments.<env>.<channel>.<key>`) with one
//! `UpdateItem` call each, so concurrent edits to different keys never
//! overwrite one another.

mod attributes;

use std::time::Duration;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::describe_table::DescribeTableError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::operation::update_item::builders::UpdateItemFluentBuilder;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus,
};
use serde_json::Value;
use tracing::{debug, info};

use self::attributes::{encode, item_to_record, record_to_item, to_attribute};
use super::aws::StoreConfig;
use crate::domain::ports::{SectionPath, TenantRecordStore, TenantRecordStoreError};
use crate::domain::{EnvironmentName, EnvironmentRecord, Section, SectionEdit, TenantId, TenantRecord};

const ATTR_CLIENT_ID: &str = "clientId";
const ATTR_ENVIRONMENTS: &str = "environments";
const ATTR_CONTENT: &str = "content";
const ATTR_SHOW: &str = "show";

const TABLE_POLL_INTERVAL: Duration = Duration::from_secs(2);
const TABLE_POLL_ATTEMPTS: u32 = 30;

/// Expression fragment addressing the section of a [`SectionPath`].
const SECTION_PATH: &str = "#envs.#env.#channel.#key";

fn tenant_exists() -> String {
    format!("attribute_exists({ATTR_CLIENT_ID})")
}

fn map_sdk_error<E, R>(error: &SdkError<E, R>) -> TenantRecordStoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match error {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            TenantRecordStoreError::connection(format!("{error:?}"))
        }
        _ => TenantRecordStoreError::query(
            aws_sdk_dynamodb::error::DisplayErrorContext(error).to_string(),
        ),
    }
}

fn is_update_conditional_failure<R>(error: &SdkError<UpdateItemError, R>) -> bool {
    matches!(
        error,
        SdkError::ServiceError(service) if matches!(
            service.err(),
            UpdateItemError::ConditionalCheckFailedException(_)
        )
    )
}

fn is_put_conditional_failure<R>(error: &SdkError<PutItemError, R>) -> bool {
    matches!(
        error,
        SdkError::ServiceError(service) if matches!(
            service.err(),
            PutItemError::ConditionalCheckFailedException(_)
        )
    )
}

/// [`TenantRecordStore`] over a DynamoDB table.
#[derive(Clone)]
pub struct DynamoRecordStore {
    client: Client,
    table_name: String,
}

impl std::fmt::Debug for DynamoRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoRecordStore")
            .field("table_name", &self.table_name)
            .finish()
    }
}

impl DynamoRecordStore {
    /// Build the adapter from the shared SDK configuration, applying the
    /// endpoint override from `config`.
    #[must_use]
    pub fn new(sdk_config: &SdkConfig, config: &StoreConfig) -> Self {
        let mut builder = aws_sdk_dynamodb::config::Builder::from(sdk_config);
        if let Some(endpoint) = config.dynamodb_endpoint() {
            builder = builder.endpoint_url(endpoint);
        }
        Self::from_client(Client::from_conf(builder.build()), config.table_name())
    }

    /// Store using an already configured client.
    #[must_use]
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    /// Create the tenant table when it does not exist and wait until it is
    /// active. Returns whether the table was created.
    ///
    /// # Errors
    ///
    /// Store failures, or a table that never becomes active.
    pub async fn ensure_table(&self) -> Result<bool, TenantRecordStoreError> {
        if self.table_status().await?.is_some() {
            return Ok(false);
        }
        self.client
            .create_table()
            .table_name(&self.table_name)
            .key_schema(
                KeySchemaElement::builder()
                    .attribute_name(ATTR_CLIENT_ID)
                    .key_type(KeyType::Hash)
                    .build()
                    .map_err(|error| TenantRecordStoreError::query(error.to_string()))?,
            )
            .attribute_definitions(
                AttributeDefinition::builder()
                    .attribute_name(ATTR_CLIENT_ID)
                    .attribute_type(ScalarAttributeType::N)
                    .build()
                    .map_err(|error| TenantRecordStoreError::query(error.to_string()))?,
            )
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|error| map_sdk_error(&error))?;
        info!(table = %self.table_name, "table created");

        for _ in 0..TABLE_POLL_ATTEMPTS {
            if self.table_status().await? == Some(TableStatus::Active) {
                return Ok(true);
            }
            tokio::time::sleep(TABLE_POLL_INTERVAL).await;
        }
        Err(TenantRecordStoreError::query(format!(
            "table {} did not become active",
            self.table_name
        )))
    }

    async fn table_status(&self) -> Result<Option<TableStatus>, TenantRecordStoreError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(output) => Ok(output.table().and_then(|table| table.table_status().cloned())),
            Err(SdkError::ServiceError(service))
                if matches!(service.err(), DescribeTableError::ResourceNotFoundException(_)) =>
            {
                Ok(None)
            }
            Err(error) => Err(map_sdk_error(&error)),
        }
    }

    fn key(tenant_id: TenantId) -> AttributeValue {
        AttributeValue::N(tenant_id.get().to_string())
    }

    /// `UpdateItem` scoped to the section addressed by `path`.
    fn section_update(&self, path: &SectionPath) -> UpdateItemFluentBuilder {
        self.client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_CLIENT_ID, Self::key(path.tenant_id))
            .expression_attribute_names("#envs", ATTR_ENVIRONMENTS)
            .expression_attribute_names("#env", path.environment.as_str())
            .expression_attribute_names("#channel", path.channel.as_str())
            .expression_attribute_names("#key", path.key.as_str())
    }

    async fn send_section_update(
        &self,
        path: &SectionPath,
        request: UpdateItemFluentBuilder,
        missing: TenantRecordStoreError,
    ) -> Result<(), TenantRecordStoreError> {
        match request.send().await {
            Ok(_) => {
                debug!(%path, "section updated");
                Ok(())
            }
            Err(error) if is_update_conditional_failure(&error) => Err(missing),
            Err(error) => Err(map_sdk_error(&error)),
        }
    }
}

#[async_trait]
impl TenantRecordStore for DynamoRecordStore {
    async fn fetch(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<TenantRecord>, TenantRecordStoreError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_CLIENT_ID, Self::key(tenant_id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|error| map_sdk_error(&error))?;
        response
            .item()
            .map(item_to_record)
            .transpose()
            .map_err(TenantRecordStoreError::decode)
    }

    async fn create(&self, record: &TenantRecord) -> Result<bool, TenantRecordStoreError> {
        let item = record_to_item(record).map_err(TenantRecordStoreError::decode)?;
        let outcome = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(#pk)")
            .expression_attribute_names("#pk", ATTR_CLIENT_ID)
            .send()
            .await;
        match outcome {
            Ok(_) => Ok(true),
            Err(error) if is_put_conditional_failure(&error) => Ok(false),
            Err(error) => Err(map_sdk_error(&error)),
        }
    }

    async fn put_section(
        &self,
        path: &SectionPath,
        section: &Section,
    ) -> Result<(), TenantRecordStoreError> {
        let value = encode(section).map_err(TenantRecordStoreError::decode)?;
        let request = self
            .section_update(path)
            .update_expression(format!("SET {SECTION_PATH} = :section"))
            .condition_expression(tenant_exists())
            .expression_attribute_values(":section", value);
        self.send_section_update(
            path,
            request,
            TenantRecordStoreError::missing_tenant(path.tenant_id.get()),
        )
        .await
    }

    async fn remove_section(&self, path: &SectionPath) -> Result<(), TenantRecordStoreError> {
        let request = self
            .section_update(path)
            .update_expression(format!("REMOVE {SECTION_PATH}"))
            .condition_expression(tenant_exists());
        self.send_section_update(
            path,
            request,
            TenantRecordStoreError::missing_tenant(path.tenant_id.get()),
        )
        .await
    }

    async fn edit_section(
        &self,
        path: &SectionPath,
        edit: &SectionEdit,
    ) -> Result<(), TenantRecordStoreError> {
        let mut assignments = Vec::new();
        let mut request = self
            .section_update(path)
            .condition_expression(format!("attribute_exists({SECTION_PATH})"));
        if let Some(content) = &edit.content {
            let value = encode(content).map_err(TenantRecordStoreError::decode)?;
            assignments.push(format!("{SECTION_PATH}.#content = :content"));
            request = request
                .expression_attribute_names("#content", ATTR_CONTENT)
                .expression_attribute_values(":content", value);
        }
        if let Some(show) = edit.show {
            assignments.push(format!("{SECTION_PATH}.#show = :show"));
            request = request
                .expression_attribute_names("#show", ATTR_SHOW)
                .expression_attribute_values(":show", to_attribute(&Value::Bool(show)));
        }
        if assignments.is_empty() {
            return Ok(());
        }
        let request = request.update_expression(format!("SET {}", assignments.join(", ")));
        self.send_section_update(
            path,
            request,
            TenantRecordStoreError::missing_section(path.key.as_str()),
        )
        .await
    }

    async fn replace_environment(
        &self,
        tenant_id: TenantId,
        target: EnvironmentName,
        environment: &EnvironmentRecord,
    ) -> Result<(), TenantRecordStoreError> {
        let value = encode(environment).map_err(TenantRecordStoreError::decode)?;
        let outcome = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ATTR_CLIENT_ID, Self::key(tenant_id))
            .update_expression("SET #envs.#target = :environment")
            .condition_expression(tenant_exists())
            .expression_attribute_names("#envs", ATTR_ENVIRONMENTS)
            .expression_attribute_names("#target", target.as_str())
            .expression_attribute_values(":environment", value)
            .send()
            .await;
        match outcome {
            Ok(_) => Ok(()),
            Err(error) if is_update_conditional_failure(&error) => {
                Err(TenantRecordStoreError::missing_tenant(tenant_id.get()))
            }
            Err(error) => Err(map_sdk_error(&error)),
        }
    }
}
