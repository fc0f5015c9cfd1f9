use crate::error::ApiError;
use crate::transport::{
    ApiRequest, MultipartForm, RequestBody, Transport, MULTIPART_CONTENT_TYPE,
};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;
use workbench_core::{
    Interaction, InteractionId, InteractionQuery, NewInteraction, Page, UploadReceipt,
};

pub const INTERACTIONS_PATH: &str = "/interactions";
const UPLOAD_FIELD: &str = "file";
const CSV_MIME: &str = "text/csv";

/// A CSV file staged for bulk ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl CsvUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(Self { file_name, bytes })
    }
}

/// Typed operations on the interactions resource.
#[derive(Debug)]
pub struct InteractionsClient<T> {
    transport: T,
}

impl<T: Transport> InteractionsClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Empty or missing filters are left off the query string.
    pub fn fetch_interactions(
        &self,
        query: &InteractionQuery,
    ) -> Result<Page<Interaction>, ApiError> {
        let params = query.to_params();
        debug!(params = params.len(), "fetching interactions");
        self.transport.get(INTERACTIONS_PATH, params)?.json()
    }

    pub fn fetch_interaction(&self, id: InteractionId) -> Result<Interaction, ApiError> {
        let path = format!("{}/{}", INTERACTIONS_PATH, id);
        self.transport.get(&path, Vec::new())?.json()
    }

    pub fn create_interaction(&self, record: &NewInteraction) -> Result<Interaction, ApiError> {
        let body = serde_json::to_value(record).map_err(ApiError::Encode)?;
        self.transport
            .post(INTERACTIONS_PATH, RequestBody::Json(body))?
            .json()
    }

    pub fn upload_csv(&self, upload: CsvUpload) -> Result<UploadReceipt, ApiError> {
        debug!(file = %upload.file_name, bytes = upload.bytes.len(), "uploading csv");
        let form = MultipartForm::new().file(UPLOAD_FIELD, upload.file_name, CSV_MIME, upload.bytes);
        let request = ApiRequest::post(INTERACTIONS_PATH, RequestBody::Multipart(form))
            .with_content_type(MULTIPART_CONTENT_TYPE);
        self.transport.send(&request)?.json()
    }
}
