//! Translating handler panics into HTTP errors.

use std::any::Any;

use http::StatusCode;

/// The message sent when no [`FailureHandler`] is configured.
pub(crate) const GENERIC_FAILURE: &str = "Internal server error";

/// Maps the payload of a panicking handler to a status and message.
///
/// Implemented for any closure of the same shape:
///
/// ```rust
/// use waymark::{Router, StatusCode, panic_message};
///
/// let router: Router = Router::new().on_failure(|payload: &(dyn std::any::Any + Send)| {
///     match panic_message(payload) {
///         Some(msg) if msg.starts_with("forbidden") => (StatusCode::FORBIDDEN, msg.to_owned()),
///         _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_owned()),
///     }
/// });
/// ```
pub trait FailureHandler: Send + Sync + 'static {
    fn http_error_for_panic(&self, payload: &(dyn Any + Send)) -> (StatusCode, String);
}

impl<F> FailureHandler for F
where
    F: Fn(&(dyn Any + Send)) -> (StatusCode, String) + Send + Sync + 'static,
{
    fn http_error_for_panic(&self, payload: &(dyn Any + Send)) -> (StatusCode, String) {
        self(payload)
    }
}

/// The text of a panic raised with `panic!("…")`, if the payload is a string.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_static_and_formatted_messages() {
        let lit: Box<dyn Any + Send> = Box::new("boom");
        let fmt: Box<dyn Any + Send> = Box::new(format!("boom {}", 2));
        let other: Box<dyn Any + Send> = Box::new(17_u32);

        assert_eq!(panic_message(lit.as_ref()), Some("boom"));
        assert_eq!(panic_message(fmt.as_ref()), Some("boom 2"));
        assert_eq!(panic_message(other.as_ref()), None);
    }

    #[test]
    fn closures_are_failure_handlers() {
        let handler = |_: &(dyn Any + Send)| (StatusCode::IM_A_TEAPOT, "short and stout".to_owned());
        let payload: Box<dyn Any + Send> = Box::new(());
        assert_eq!(
            handler.http_error_for_panic(payload.as_ref()),
            (StatusCode::IM_A_TEAPOT, "short and stout".to_owned())
        );
    }
}
