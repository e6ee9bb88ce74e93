/// Implements `as_str`, `Display`, `FromStr` and `ALL` for a fieldless
/// enum whose variants map one-to-one onto fixed wire strings.
macro_rules! text_enum {
    ($ty:ident, $label:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Return the wire representation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $ty {
            type Err = complyhub_core::AppError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    _ => {
                        let expected: Vec<&str> = vec![$($text),+];
                        Err(complyhub_core::AppError::validation(format!(
                            "Invalid {}: '{s}'. Expected one of: {}",
                            $label,
                            expected.join(", ")
                        )))
                    }
                }
            }
        }
    };
}
