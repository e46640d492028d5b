pub mod sse;
pub mod storage_path;
pub mod url;
