//! Macro for implementing Display and FromStr for scenario axis enums
//!
//! Scenario axes appear in benchmark identifiers, logs and configuration, so
//! each needs a stable string form and case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use meterbench_domain::impl_scenario_axis_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Exporter {
//!     Pull,
//!     Push,
//! }
//!
//! impl_scenario_axis_conversions!(Exporter {
//!     Pull => "pull",
//!     Push => "push",
//! });
//!
//! assert_eq!(Exporter::Push.to_string(), "push");
//! assert_eq!("PULL".parse::<Exporter>().unwrap(), Exporter::Pull);
//! ```

/// Implements Display and FromStr traits for scenario axis enums
///
/// This macro generates:
/// - Display trait: writes the variant's identifier string
/// - FromStr trait: parses case-insensitive strings to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_scenario_axis_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stable identifier used in benchmark names.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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
