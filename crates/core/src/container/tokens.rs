//! Implementation names
//!
//! Several bindings may share one dependency type; a [`Token`] tells them
//! apart. Tokens are opaque: any `Eq + Debug + Send + Sync + 'static` value can
//! be used, and two tokens are equal only when they hold values of the same
//! Rust type that compare equal. String slices are stored as `String` so that
//! `"First"` and `String::from("First")` name the same binding.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Object-safe view of a token value
pub trait TokenValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;

    fn eq_token(&self, other: &dyn TokenValue) -> bool;

    fn display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T> TokenValue for T
where
    T: Any + fmt::Debug + Eq + Send + Sync,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn eq_token(&self, other: &dyn TokenValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .map_or(false, |other| self == other)
    }

    fn display(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_any().downcast_ref::<String>() {
            Some(text) => f.write_str(text),
            None => write!(f, "{:?}", self),
        }
    }
}

/// Opaque, comparable implementation name
#[derive(Clone)]
pub struct Token(Arc<dyn TokenValue>);

impl Token {
    /// Wrap any comparable value
    pub fn new<T: TokenValue>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the wrapped value if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// The wrapped value as text, when it is a string
    pub fn as_str(&self) -> Option<&str> {
        self.downcast_ref::<String>().map(String::as_str)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_token(other.0.as_ref())
    }
}

impl Eq for Token {}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Token").field(&self.0).finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.display(f)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

macro_rules! token_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Token {
                fn from(value: $ty) -> Self {
                    Self::new(value)
                }
            }
        )*
    };
}

token_from!(bool, char, i32, i64, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    enum Storage {
        Primary,
        Replica,
    }

    #[test]
    fn test_string_tokens_compare_by_value() {
        assert_eq!(Token::from("First"), Token::from(String::from("First")));
        assert_ne!(Token::from("First"), Token::from("Second"));
        assert_eq!(Token::from("First").as_str(), Some("First"));
    }

    #[test]
    fn test_tokens_of_different_types_never_match() {
        assert_ne!(Token::from("1"), Token::from(1i32));
        assert_ne!(Token::from(1i32), Token::from(1i64));
    }

    #[test]
    fn test_custom_token_values() {
        let primary = Token::new(Storage::Primary);
        assert_eq!(primary, Token::new(Storage::Primary));
        assert_ne!(primary, Token::new(Storage::Replica));
        assert_eq!(primary.downcast_ref::<Storage>(), Some(&Storage::Primary));
        assert_eq!(primary.to_string(), "Primary");
    }

    #[test]
    fn test_display_strips_quotes_for_strings() {
        assert_eq!(Token::from("Second").to_string(), "Second");
        assert_eq!(Token::from(42u32).to_string(), "42");
    }
}
