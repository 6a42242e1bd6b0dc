use std::fmt::{Display, Formatter, Result as FmtResult};

/// Root error type for the entire crate
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    Domain(DomainError),
    Application(ApplicationError),
    Infrastructure(InfrastructureError),
    Presentation(PresentationError),
}

/// Domain layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    Drawing(DrawingError),
    Alert(AlertError),
    Template(TemplateError),
}

/// Errors raised by tool operations that target a specific tool
#[derive(Debug, Clone, PartialEq)]
pub enum DrawingError {
    UnknownTool(u64),
    PointIndexOutOfRange { index: usize, len: usize },
    ToolLocked(u64),
    AlertsUnsupported(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AlertError {
    UnknownAlert(String),
    UnsupportedCondition { kind: String, condition: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateError {
    StoreFull { max: usize },
    NotFound(String),
    Serialization(String),
}

/// Application layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum ApplicationError {
    Feed(FeedError),
    Configuration(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeedError {
    Network(String),
    Aborted,
    Parse(String),
}

/// Infrastructure layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum InfrastructureError {
    Storage(StorageError),
    Rendering(String),
    BrowserApi(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageError {
    Unavailable,
    Read(String),
    Write(String),
}

/// Presentation layer errors
#[derive(Debug, Clone, PartialEq)]
pub enum PresentationError {
    JsInterop(String),
    ElementNotFound(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AppError::Domain(e) => write!(f, "Domain Error: {}", e),
            AppError::Application(e) => write!(f, "Application Error: {}", e),
            AppError::Infrastructure(e) => write!(f, "Infrastructure Error: {}", e),
            AppError::Presentation(e) => write!(f, "Presentation Error: {}", e),
        }
    }
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Drawing(e) => write!(f, "Drawing: {}", e),
            DomainError::Alert(e) => write!(f, "Alert: {}", e),
            DomainError::Template(e) => write!(f, "Template: {}", e),
        }
    }
}

impl Display for DrawingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DrawingError::UnknownTool(id) => write!(f, "no tool with id {}", id),
            DrawingError::PointIndexOutOfRange { index, len } => {
                write!(f, "point index {} out of range for {} anchors", index, len)
            }
            DrawingError::ToolLocked(id) => write!(f, "tool {} is locked", id),
            DrawingError::AlertsUnsupported(kind) => write!(f, "{} does not support alerts", kind),
        }
    }
}

impl Display for AlertError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            AlertError::UnknownAlert(id) => write!(f, "no alert with id {}", id),
            AlertError::UnsupportedCondition { kind, condition } => {
                write!(f, "condition {} is not available for {}", condition, kind)
            }
        }
    }
}

impl Display for TemplateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            TemplateError::StoreFull { max } => write!(f, "template limit of {} reached", max),
            TemplateError::NotFound(id) => write!(f, "no template with id {}", id),
            TemplateError::Serialization(msg) => write!(f, "serialization failed: {}", msg),
        }
    }
}

impl Display for ApplicationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            ApplicationError::Feed(e) => write!(f, "Feed: {}", e),
            ApplicationError::Configuration(msg) => write!(f, "Configuration: {}", msg),
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FeedError::Network(msg) => write!(f, "network failure: {}", msg),
            FeedError::Aborted => write!(f, "request aborted"),
            FeedError::Parse(msg) => write!(f, "malformed payload: {}", msg),
        }
    }
}

impl Display for InfrastructureError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            InfrastructureError::Storage(e) => write!(f, "Storage: {:?}", e),
            InfrastructureError::Rendering(msg) => write!(f, "Rendering: {}", msg),
            InfrastructureError::BrowserApi(msg) => write!(f, "Browser API: {}", msg),
        }
    }
}

impl Display for PresentationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PresentationError::JsInterop(msg) => write!(f, "JS interop: {}", msg),
            PresentationError::ElementNotFound(id) => write!(f, "element #{} not found", id),
        }
    }
}

impl std::error::Error for AppError {}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        AppError::Domain(error)
    }
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        AppError::Application(error)
    }
}

impl From<InfrastructureError> for AppError {
    fn from(error: InfrastructureError) -> Self {
        AppError::Infrastructure(error)
    }
}

impl From<PresentationError> for AppError {
    fn from(error: PresentationError) -> Self {
        AppError::Presentation(error)
    }
}

impl From<DrawingError> for AppError {
    fn from(error: DrawingError) -> Self {
        AppError::Domain(DomainError::Drawing(error))
    }
}

impl From<AlertError> for AppError {
    fn from(error: AlertError) -> Self {
        AppError::Domain(DomainError::Alert(error))
    }
}

impl From<TemplateError> for AppError {
    fn from(error: TemplateError) -> Self {
        AppError::Domain(DomainError::Template(error))
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::Infrastructure(InfrastructureError::Storage(error))
    }
}

impl From<FeedError> for AppError {
    fn from(error: FeedError) -> Self {
        AppError::Application(ApplicationError::Feed(error))
    }
}

impl From<serde_json::Error> for TemplateError {
    fn from(error: serde_json::Error) -> Self {
        TemplateError::Serialization(error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
