//! Named request parameters
//!
//! `request_param!` declares a newtype that extracts one named value from
//! the path captures or the query string and parses it with `FromStr`.

use super::{BindingError, Request};
use std::fmt::Display;
use std::str::FromStr;

/// Look up `name` and parse it; an empty value counts as absent
#[doc(hidden)]
pub fn parse_param<T>(req: &Request, name: &str) -> Result<T, BindingError>
where
    T: FromStr,
    T::Err: Display,
{
    match req.param(name) {
        None | Some("") => Err(BindingError::Missing(name.to_string())),
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| BindingError::malformed(name, e)),
    }
}

/// Declare newtypes bound to named request parameters.
///
/// ```
/// typemux::request_param! {
///     /// `?food=` query value
///     pub struct Food(pub String) = "food";
///     pub struct Amount(pub u32) = "amount";
/// }
/// ```
#[macro_export]
macro_rules! request_param {
    ($($(#[$meta:meta])* $vis:vis struct $name:ident($inner_vis:vis $ty:ty) = $key:literal;)+) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq)]
            $vis struct $name($inner_vis $ty);

            impl $name {
                /// Name looked up in the path captures and query string
                pub const NAME: &'static str = $key;
            }

            impl $crate::FromRequest for $name {
                fn from_request(
                    req: &$crate::Request,
                ) -> ::std::result::Result<Self, $crate::BindingError> {
                    $crate::binding::parse_param::<$ty>(req, $key).map(Self)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use crate::FromRequest;
    use hyper::Method;

    crate::request_param! {
        struct Food(String) = "food";
        struct Amount(i64) = "amount";
    }

    fn req(target: &str) -> crate::Request {
        crate::Request::from_target(Method::GET, target).unwrap()
    }

    #[test]
    fn test_param_present() {
        let r = req("/?food=nachos&amount=10");
        assert_eq!(Food::from_request(&r).unwrap(), Food("nachos".into()));
        assert_eq!(Amount::from_request(&r).unwrap(), Amount(10));
        assert_eq!(Amount::NAME, "amount");
    }

    #[test]
    fn test_param_absent_or_empty() {
        assert!(Food::from_request(&req("/")).unwrap_err().is_absent());
        assert!(Food::from_request(&req("/?food=")).unwrap_err().is_absent());
    }

    #[test]
    fn test_param_malformed() {
        let err = Amount::from_request(&req("/?amount=ten")).unwrap_err();
        assert!(!err.is_absent());
        assert!(err.to_string().starts_with("invalid value for 'amount'"));
    }
}
