//! 配置校验模块
//!
//! 校验规则：
//! - server.port != 0
//! - server.max_body_bytes > 0
//! - broker.endpoints 非空且无空字符串
//! - dispatch.publish_timeout_ms > 0
//! - dispatch.max_message_bytes > 0

use contracts::{ContractError, ServiceConfig};

/// 校验 ServiceConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &ServiceConfig) -> Result<(), ContractError> {
    validate_server(config)?;
    validate_broker(config)?;
    validate_dispatch(config)?;
    Ok(())
}

/// 校验监听配置
fn validate_server(config: &ServiceConfig) -> Result<(), ContractError> {
    if config.server.port == 0 {
        return Err(ContractError::config_validation(
            "server.port",
            "port must be > 0",
        ));
    }

    if config.server.max_body_bytes == 0 {
        return Err(ContractError::config_validation(
            "server.max_body_bytes",
            "max_body_bytes must be > 0",
        ));
    }
    Ok(())
}

/// 校验 broker 地址列表
fn validate_broker(config: &ServiceConfig) -> Result<(), ContractError> {
    let broker = &config.broker;

    if broker.endpoints.is_empty() {
        return Err(ContractError::config_validation(
            "broker.endpoints",
            "at least one broker endpoint is required",
        ));
    }

    for (idx, endpoint) in broker.endpoints.iter().enumerate() {
        if endpoint.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("broker.endpoints[{}]", idx),
                "endpoint cannot be empty",
            ));
        }
    }

    if broker.connect_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "broker.connect_timeout_ms",
            "connect_timeout_ms must be > 0",
        ));
    }

    Ok(())
}

/// 校验分发策略
fn validate_dispatch(config: &ServiceConfig) -> Result<(), ContractError> {
    let dispatch = &config.dispatch;

    if dispatch.publish_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "dispatch.publish_timeout_ms",
            "publish_timeout_ms must be > 0",
        ));
    }

    if dispatch.max_message_bytes == 0 {
        return Err(ContractError::config_validation(
            "dispatch.max_message_bytes",
            "max_message_bytes must be > 0",
        ));
    }

    Ok(())
}
