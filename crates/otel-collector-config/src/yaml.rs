//! Utility functions for processing data in the YAML file format
use std::io::Write;

use serde::ser;
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Serializes the given data structure as YAML and writes it to a [`Write`].
///
/// Mappings are indented by two spaces. No document separator (`---`) is written.
pub fn serialize<T, W>(writer: W, value: &T) -> Result<()>
where
    T: ser::Serialize,
    W: Write,
{
    let mut serializer = serde_yaml::Serializer::new(writer);
    value
        .serialize(&mut serializer)
        .context(SerializeYamlSnafu)?;

    Ok(())
}

/// Serializes the given data structure into a YAML [`String`].
pub fn serialize_to_string<T>(value: &T) -> Result<String>
where
    T: ser::Serialize,
{
    let mut buffer = Vec::new();
    serialize(&mut buffer, value)?;

    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}
