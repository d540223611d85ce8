use crate::{Account, LedgerEntry};

/// Possible errors to occur while encoding or decoding record lines
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The line could not be decoded; callers skip it and keep going
    #[error("malformed record line: {0:?}")]
    Malformed(String),
    #[error("failed to encode record")]
    Encode(#[source] csv::Error),
}

/// Encodes one account record as a `id,holder,balance` line
///
/// A holder name containing the delimiter (or a quote) comes out quoted
/// according to the usual CSV rules, so it survives a decode round trip.
/// The returned line carries no trailing line break.
pub fn encode_account(account: &Account) -> Result<String, CodecError> {
    encode(account)
}

/// Decodes one `id,holder,balance` line into an account record
pub fn decode_account(line: &str) -> Result<Account, CodecError> {
    decode(line)
}

/// Encodes one ledger entry as a `account_id,kind,amount` line
pub fn encode_entry(entry: &LedgerEntry) -> Result<String, CodecError> {
    encode(entry)
}

/// Decodes one `account_id,kind,amount` line into a ledger entry
pub fn decode_entry(line: &str) -> Result<LedgerEntry, CodecError> {
    decode(line)
}

fn encode<S: serde::Serialize>(record: &S) -> Result<String, CodecError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(&mut buf);
        writer.serialize(record).map_err(CodecError::Encode)?;
        writer
            .flush()
            .map_err(|err| CodecError::Encode(err.into()))?;
    }

    // the csv writer terminates the record with a line break
    Ok(String::from_utf8_lossy(&buf).trim_end().to_string())
}

fn decode<D: serde::de::DeserializeOwned>(line: &str) -> Result<D, CodecError> {
    // no field trimming: holder names keep their whitespace through a
    // round trip, and the encoder never emits padding anyway
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(line.as_bytes());

    reader
        .deserialize()
        .next()
        .ok_or_else(|| CodecError::Malformed(line.to_string()))?
        .map_err(|_| CodecError::Malformed(line.to_string()))
}
