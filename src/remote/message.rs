//! Remote control messages
//!
//! A message is an address path plus a list of typed arguments, in the
//! manner of OSC. On the wire each datagram carries one message
//! serialised with bincode.
//!
//! Methods declare the argument types they accept as a typespec string,
//! one character per argument: `i` integer, `f` float, `d` double, `s`
//! string. Numeric arguments are coerced between the numeric types;
//! strings never are.

use serde::{Deserialize, Serialize};
use std::net::{SocketAddr, UdpSocket};

use crate::error::RemoteError;

/// Largest datagram the server will read
pub const MAX_DATAGRAM: usize = 4096;

/// One typed argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    Int(i32),
    Float(f32),
    Double(f64),
    Str(String),
}

impl Arg {
    pub fn type_tag(&self) -> char {
        match self {
            Arg::Int(_) => 'i',
            Arg::Float(_) => 'f',
            Arg::Double(_) => 'd',
            Arg::Str(_) => 's',
        }
    }

    /// Numeric value as a double
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Int(v) => Some(*v as f64),
            Arg::Float(v) => Some(*v as f64),
            Arg::Double(v) => Some(*v),
            Arg::Str(_) => None,
        }
    }

    /// Numeric value truncated to an integer
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Arg::Int(v) => Some(*v),
            Arg::Float(v) if v.is_finite() => Some(*v as i32),
            Arg::Double(v) if v.is_finite() => Some(*v as i32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to the type named by `tag`, if allowed
    pub fn coerce(&self, tag: char) -> Option<Arg> {
        match tag {
            'i' => self.as_i32().map(Arg::Int),
            'f' => self.as_f64().map(|v| Arg::Float(v as f32)),
            'd' => self.as_f64().map(Arg::Double),
            's' => self.as_str().map(|s| Arg::Str(s.to_string())),
            _ => None,
        }
    }
}

/// An addressed message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub path: String,
    pub args: Vec<Arg>,
}

impl Message {
    pub fn new(path: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            path: path.into(),
            args,
        }
    }

    /// Type tags of the arguments, eg. `"id"`
    pub fn typetags(&self) -> String {
        self.args.iter().map(Arg::type_tag).collect()
    }

    /// The arguments converted to match `typespec`, or `None` if the
    /// count differs or an argument cannot be converted
    pub fn coerce(&self, typespec: &str) -> Option<Vec<Arg>> {
        if typespec.chars().count() != self.args.len() {
            return None;
        }
        typespec
            .chars()
            .zip(&self.args)
            .map(|(tag, arg)| arg.coerce(tag))
            .collect()
    }

    pub fn encode(&self) -> Result<Vec<u8>, RemoteError> {
        bincode::serialize(self).map_err(|e| RemoteError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, RemoteError> {
        bincode::deserialize(bytes).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    /// Encode and send as a single datagram
    pub fn send_to(&self, socket: &UdpSocket, target: SocketAddr) -> Result<(), RemoteError> {
        let bytes = self.encode()?;
        if bytes.len() > MAX_DATAGRAM {
            return Err(RemoteError::Encode(format!(
                "message of {} bytes exceeds {}",
                bytes.len(),
                MAX_DATAGRAM
            )));
        }
        socket
            .send_to(&bytes, target)
            .map_err(|e| RemoteError::SendFailed(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typetags() {
        let msg = Message::new(
            "/deck1/cue/set",
            vec![Arg::Int(1), Arg::Double(2.5), Arg::Str("x".into())],
        );
        assert_eq!(msg.typetags(), "ids");
    }

    #[test]
    fn test_numeric_coercion() {
        let msg = Message::new("/deck1/pitch", vec![Arg::Int(1)]);
        assert_eq!(msg.coerce("d"), Some(vec![Arg::Double(1.0)]));

        let msg = Message::new("/deck1/cue", vec![Arg::Double(3.9)]);
        assert_eq!(msg.coerce("i"), Some(vec![Arg::Int(3)]));
    }

    #[test]
    fn test_strings_do_not_coerce() {
        let msg = Message::new("/deck1/pitch", vec![Arg::Str("1.0".into())]);
        assert_eq!(msg.coerce("d"), None);

        let msg = Message::new("/deck1/load", vec![Arg::Int(4)]);
        assert_eq!(msg.coerce("s"), None);
    }

    #[test]
    fn test_arity_must_match() {
        let msg = Message::new("/deck1/cue/set", vec![Arg::Int(1), Arg::Double(2.0)]);
        assert_eq!(msg.coerce("i"), None);
        assert!(msg.coerce("id").is_some());
        assert_eq!(Message::new("/deck1/play", vec![]).coerce(""), Some(vec![]));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(Message::decode(&[0xff, 0xff, 0xff]).is_err());

        let msg = Message::new("/deck2/load", vec![Arg::Str("/music/a.flac".into())]);
        assert_eq!(Message::decode(&msg.encode().unwrap()).unwrap(), msg);
    }

    #[test]
    fn test_non_finite_is_not_an_integer() {
        assert_eq!(Arg::Double(f64::NAN).as_i32(), None);
        assert_eq!(Arg::Float(f32::INFINITY).coerce('i'), None);
    }
}
