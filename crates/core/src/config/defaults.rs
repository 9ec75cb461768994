//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_PROVIDER: &str = "grpc";
pub(crate) const DEFAULT_HOST: &str = "localhost";

pub(crate) fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

pub(crate) fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub(crate) fn default_port() -> u16 {
    19530
}

pub(crate) fn default_timeout_ms() -> u64 {
    30_000
}

pub(crate) fn default_connect_timeout_ms() -> u64 {
    5_000
}

pub(crate) fn default_verify_on_connect() -> bool {
    false
}

pub(crate) fn default_min_segment_row_limit() -> u64 {
    4_096
}

pub(crate) fn default_max_segment_row_limit() -> u64 {
    4_194_304
}

pub(crate) fn default_segment_row_limit() -> u64 {
    524_288
}

pub(crate) fn default_max_dimension() -> u32 {
    crate::schema::MAX_DIMENSION
}
