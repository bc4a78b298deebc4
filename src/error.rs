use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListerError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("OpenAI API key not set. Set OPENAI_API_KEY or run `ebay-lister config --set-openai-key YOUR_KEY`")]
    MissingApiKey,

    #[error("Missing eBay credentials: set EBAY_CLIENT_ID, EBAY_CLIENT_SECRET and EBAY_REFRESH_TOKEN")]
    MissingCredentials,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("AI analysis error: {0}")]
    AiAnalysis(String),

    #[error("Invalid listing: {0}")]
    InvalidListing(String),

    #[error("eBay API error: {0}")]
    Ebay(String),

    #[error("Picture service upload error: {0}")]
    EpsUpload(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ListerError>;
