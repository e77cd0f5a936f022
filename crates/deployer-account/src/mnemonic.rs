//! Conversion between 25-word account mnemonics and ed25519 seeds.
//!
//! The first 24 words pack the 32-byte seed as little-endian 11-bit groups
//! (264 bits, the final 8 of which must be zero). The 25th word is the first
//! 11 bits of the SHA-512/256 digest of the seed.

use bip39::Language;
use deployer_types::{DeployError, Result};
use sha2::{Digest, Sha512_256};
use zeroize::Zeroizing;

pub const MNEMONIC_WORDS: usize = 25;

const SEED_LEN: usize = 32;
const BITS_PER_WORD: u32 = 11;
const WORD_MASK: u32 = (1 << BITS_PER_WORD) - 1;

/// Recovers the ed25519 seed from a mnemonic phrase.
pub fn seed_from_mnemonic(phrase: &str) -> Result<Zeroizing<[u8; SEED_LEN]>> {
	let words: Vec<&str> = phrase.split_whitespace().collect();
	if words.len() != MNEMONIC_WORDS {
		return Err(DeployError::Account(format!(
			"mnemonic must have {} words, got {}",
			MNEMONIC_WORDS,
			words.len()
		)));
	}

	let mut indices = Zeroizing::new(Vec::with_capacity(MNEMONIC_WORDS));
	for word in &words {
		let index = Language::English
			.find_word(&word.to_lowercase())
			.ok_or_else(|| DeployError::Account(format!("unknown mnemonic word '{}'", word)))?;
		indices.push(index);
	}

	let (checksum_word, key_words) = match indices.split_last() {
		Some(split) => split,
		None => return Err(DeployError::Account("empty mnemonic".to_string())),
	};

	let bytes = Zeroizing::new(pack_words(key_words));
	if bytes.len() != SEED_LEN + 1 || bytes[SEED_LEN] != 0 {
		return Err(DeployError::Account(
			"mnemonic does not encode a 32-byte key".to_string(),
		));
	}

	let mut seed = Zeroizing::new([0u8; SEED_LEN]);
	seed.copy_from_slice(&bytes[..SEED_LEN]);

	if checksum_word_index(&seed) != *checksum_word {
		return Err(DeployError::Account("mnemonic checksum mismatch".to_string()));
	}

	Ok(seed)
}

/// Renders the mnemonic phrase for an ed25519 seed.
#[cfg(test)]
pub(crate) fn mnemonic_from_seed(seed: &[u8; SEED_LEN]) -> String {
	let list = Language::English.word_list();
	let mut indices = split_words(seed);
	indices.push(checksum_word_index(seed));
	indices
		.iter()
		.map(|&i| list[i as usize])
		.collect::<Vec<_>>()
		.join(" ")
}

fn checksum_word_index(seed: &[u8; SEED_LEN]) -> u16 {
	let digest = Sha512_256::digest(seed);
	split_words(&digest[..2])[0]
}

/// Splits bytes into little-endian 11-bit groups, zero-padding the last one.
fn split_words(data: &[u8]) -> Vec<u16> {
	let mut buffer: u32 = 0;
	let mut bits: u32 = 0;
	let mut out = Vec::with_capacity(data.len() * 8 / BITS_PER_WORD as usize + 1);

	for &byte in data {
		buffer |= (byte as u32) << bits;
		bits += 8;
		if bits >= BITS_PER_WORD {
			out.push((buffer & WORD_MASK) as u16);
			buffer >>= BITS_PER_WORD;
			bits -= BITS_PER_WORD;
		}
	}
	if bits != 0 {
		out.push((buffer & WORD_MASK) as u16);
	}
	out
}

/// Inverse of [`split_words`]: packs 11-bit groups back into bytes.
fn pack_words(words: &[u16]) -> Vec<u8> {
	let mut buffer: u32 = 0;
	let mut bits: u32 = 0;
	let mut out = Vec::with_capacity(words.len() * BITS_PER_WORD as usize / 8 + 1);

	for &word in words {
		buffer |= (word as u32) << bits;
		bits += BITS_PER_WORD;
		while bits >= 8 {
			out.push((buffer & 0xff) as u8);
			buffer >>= 8;
			bits -= 8;
		}
	}
	if bits != 0 {
		out.push((buffer & 0xff) as u8);
	}
	out
}
