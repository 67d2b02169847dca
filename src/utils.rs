use crate::prelude::*;

pub struct Utils;

impl Utils {
    /// Lowercase hex with a space between bytes, as the debug port prints
    /// frames.
    pub fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parse hex bytes, ignoring whitespace, `:` separators and a leading
    /// `0x`.
    pub fn parse_hex(input: &str) -> Result<Vec<u8>> {
        let digits: String = input
            .trim()
            .trim_start_matches("0x")
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ':')
            .collect();

        if !digits.is_ascii() {
            bail!("non-hex characters in {:?}", input);
        }
        if digits.len() % 2 != 0 {
            bail!("odd number of hex digits in {:?}", input);
        }

        (0..digits.len())
            .step_by(2)
            .map(|i| {
                u8::from_str_radix(&digits[i..i + 2], 16)
                    .map_err(|err| anyhow!("invalid hex {:?}: {}", &digits[i..i + 2], err))
            })
            .collect()
    }

    /// Decimal, or hex with a `0x` prefix.
    pub fn parse_u32(input: &str) -> Result<u32> {
        let input = input.trim();
        let r = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => input.parse::<u32>(),
        };
        r.map_err(|err| anyhow!("invalid number {:?}: {}", input, err))
    }

    pub fn parse_u8(input: &str) -> Result<u8> {
        let value = Self::parse_u32(input)?;
        u8::try_from(value).map_err(|_| anyhow!("{} does not fit in a byte", input))
    }
}
