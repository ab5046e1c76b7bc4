//! Macro for implementing Display and FromStr for string-keyed enums
//!
//! Used for enums whose variants map onto stable wire or storage names
//! (credential keys, error kinds). Parsing is case-insensitive.
//!
//! # Example
//!
//! ```rust
//! use marketlink_domain::impl_domain_str_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Placement {
//!     Header,
//!     Sidebar,
//! }
//!
//! impl_domain_str_conversions!(Placement {
//!     Header => "header",
//!     Sidebar => "sidebar",
//! });
//!
//! assert_eq!(Placement::Header.to_string(), "header");
//! assert_eq!("SIDEBAR".parse::<Placement>().unwrap(), Placement::Sidebar);
//! ```

/// Implements Display and FromStr traits for string-keyed enums.
///
/// The string representations must be lowercase.
#[macro_export]
macro_rules! impl_domain_str_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum TestKey {
        AccessToken,
        User,
    }

    impl_domain_str_conversions!(TestKey {
        AccessToken => "access_token",
        User => "user",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(TestKey::AccessToken.to_string(), "access_token");
        assert_eq!(TestKey::User.to_string(), "user");
    }

    #[test]
    fn test_fromstr_is_case_insensitive() {
        assert_eq!(TestKey::from_str("ACCESS_TOKEN").unwrap(), TestKey::AccessToken);
        assert_eq!(TestKey::from_str("User").unwrap(), TestKey::User);
    }

    #[test]
    fn test_fromstr_invalid() {
        let err = TestKey::from_str("session").unwrap_err();
        assert!(err.contains("Invalid TestKey"));
        assert!(err.contains("session"));
    }
}
