use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Speech output format of the narration model: 16-bit little-endian mono PCM.
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;
pub const NARRATION_CHANNELS: u16 = 1;
pub const NARRATION_BITS_PER_SAMPLE: u16 = 16;

pub fn is_wav(bytes: &[u8]) -> bool {
    bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE"
}

/// Prepends a canonical 44-byte RIFF/WAVE header to raw PCM samples.
pub fn pcm_to_wav(pcm: &[u8], sample_rate: u32, channels: u16, bits_per_sample: u16) -> Vec<u8> {
    let block_align = channels * bits_per_sample / 8;
    let byte_rate = sample_rate * block_align as u32;
    let data_size = pcm.len() as u32;

    let mut out = Vec::with_capacity(44 + pcm.len());
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&bits_per_sample.to_le_bytes());

    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    out.extend_from_slice(pcm);
    out
}

/// Decodes a narration payload into playable WAV bytes. Payloads that
/// already carry a WAV header are returned as-is.
pub fn narration_wav(audio_base64: &str) -> Result<Vec<u8>> {
    let bytes = STANDARD
        .decode(audio_base64.trim())
        .context("Narration payload is not valid base64")?;
    if bytes.is_empty() {
        return Err(anyhow!("Narration payload is empty"));
    }
    if is_wav(&bytes) {
        return Ok(bytes);
    }
    Ok(pcm_to_wav(
        &bytes,
        NARRATION_SAMPLE_RATE,
        NARRATION_CHANNELS,
        NARRATION_BITS_PER_SAMPLE,
    ))
}

pub fn narration_data_uri(audio_base64: &str) -> Result<String> {
    let wav = narration_wav(audio_base64)?;
    Ok(format!("data:audio/wav;base64,{}", STANDARD.encode(wav)))
}

/// Splits `data:<mime>;base64,<payload>` into its MIME type and decoded bytes.
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| anyhow!("Not a data URI"))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| anyhow!("Data URI has no payload"))?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or_else(|| anyhow!("Only base64 data URIs are supported"))?;
    let bytes = STANDARD.decode(payload).context("Data URI payload is not valid base64")?;
    Ok((mime.to_string(), bytes))
}
