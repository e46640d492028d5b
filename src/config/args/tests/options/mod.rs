mod dry_run;
mod force_retry;
mod performance;
mod sse;
mod tracing;
