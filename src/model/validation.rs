use crate::{
    config::{AppConfig, ServiceVariant},
    error::ServiceError,
    model::GenerationRequest,
};

/// Checks the request fields and returns the requested max length with the
/// default applied. Runs before anything touches the model.
pub fn validate_request(
    request: &GenerationRequest,
    config: &AppConfig,
) -> Result<i64, ServiceError> {
    if request.prompt.trim().is_empty() {
        return Err(ServiceError::InvalidInput("prompt cannot be empty".into()));
    }

    let prompt_chars = request.prompt.chars().count();
    if prompt_chars > config.max_prompt_length {
        return Err(ServiceError::InvalidInput(format!(
            "prompt is {prompt_chars} characters long, the limit is {}",
            config.max_prompt_length
        )));
    }

    let max_length = request.max_length.unwrap_or(config.default_max_length);
    if config.variant == ServiceVariant::Hardened
        && !(config.min_max_length..=config.max_output_length).contains(&max_length)
    {
        return Err(ServiceError::InvalidInput(format!(
            "max_length must be between {} and {}, got {max_length}",
            config.min_max_length, config.max_output_length
        )));
    }

    Ok(max_length)
}

pub fn check_prompt_tokens(prompt_tokens: usize, config: &AppConfig) -> Result<(), ServiceError> {
    if prompt_tokens > config.max_prompt_tokens {
        return Err(ServiceError::InvalidInput(format!(
            "prompt is {prompt_tokens} tokens long, the limit is {}",
            config.max_prompt_tokens
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(prompt: &str, max_length: Option<i64>) -> GenerationRequest {
        GenerationRequest {
            prompt: prompt.to_string(),
            max_length,
        }
    }

    fn basic() -> AppConfig {
        AppConfig {
            variant: ServiceVariant::Basic,
            ..AppConfig::default()
        }
    }

    #[test]
    fn blank_prompts_are_rejected() {
        let config = AppConfig::default();
        for prompt in ["", " ", "\n\t  ", "\u{3000}"] {
            let err = validate_request(&request(prompt, None), &config).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{prompt:?}");
        }
        assert!(validate_request(&request("", None), &basic()).is_err());
    }

    #[test]
    fn prompt_length_is_counted_in_characters() {
        let config = AppConfig::default();
        let at_limit = "é".repeat(1000);
        assert!(validate_request(&request(&at_limit, None), &config).is_ok());

        let over_limit = "a".repeat(1001);
        let err = validate_request(&request(&over_limit, None), &config).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(validate_request(&request(&over_limit, None), &basic()).is_err());
    }

    #[test]
    fn max_length_defaults_when_absent() {
        let max_length = validate_request(&request("Hello", None), &AppConfig::default()).unwrap();
        assert_eq!(max_length, 200);
    }

    #[test]
    fn hardened_rejects_out_of_range_max_length() {
        let config = AppConfig::default();
        for value in [i64::MIN, -1, 0, 9, 501, 10_000] {
            let err = validate_request(&request("Hello", Some(value)), &config).unwrap_err();
            assert!(matches!(err, ServiceError::InvalidInput(_)), "{value}");
        }
        for value in [10, 200, 500] {
            assert_eq!(
                validate_request(&request("Hello", Some(value)), &config).unwrap(),
                value
            );
        }
    }

    #[test]
    fn basic_accepts_any_max_length() {
        let config = basic();
        for value in [i64::MIN, -1, 0, 9, 501, i64::MAX] {
            assert_eq!(
                validate_request(&request("Hello", Some(value)), &config).unwrap(),
                value
            );
        }
    }

    #[test]
    fn token_limit_is_inclusive() {
        let config = AppConfig::default();
        assert!(check_prompt_tokens(1000, &config).is_ok());
        assert!(matches!(
            check_prompt_tokens(1001, &config),
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
