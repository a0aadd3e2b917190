use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeTransmitInterceptorContextMut;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;

/// Appends the SDK name and version to the User-Agent header so calls made
/// through this crate are identifiable in CloudTrail.
///
/// Registered on every service client built from a session.
#[derive(Debug)]
pub(crate) struct SdkUserAgentInterceptor;

impl Intercept for SdkUserAgentInterceptor {
    fn name(&self) -> &'static str {
        "SdkUserAgentInterceptor"
    }

    fn modify_before_signing(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        let request = context.request_mut();
        let agent = request.headers().get("user-agent").unwrap_or_default();
        let full_agent = format!("{agent} {}", user_agent());
        request.headers_mut().insert("user-agent", full_agent);

        Ok(())
    }
}

pub(crate) fn user_agent() -> String {
    format!(
        "self-service-sdk/{}",
        option_env!("CARGO_PKG_VERSION").unwrap_or("0.0.0")
    )
}
