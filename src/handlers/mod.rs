pub mod contact;
pub mod upload_url;
