use thiserror::Error;

/// Errors raised while validating an agent configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("action space must contain at least one action")]
    EmptyActionSpace,
    #[error("invalid value for `{name}`: {value} is not in the interval {range}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        range: &'static str,
    },
}
