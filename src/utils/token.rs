use base64::{engine::general_purpose, Engine};
use chrono::{Duration, Utc};
use libaes::Cipher;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::utils::app_error::AppError;

const NONCE_LEN: usize = 16;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    Confirm,
    Auth,
}

/// Struct that represents a serialized token
#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    exp: i64,
    sub: String,
    purpose: TokenPurpose,
}

impl Token {
    /// Create an encrypted and encoded token
    pub fn create(sub: String, purpose: TokenPurpose, exp_in: Duration, cipher: &Cipher) -> String {
        let exp = (Utc::now() + exp_in).timestamp();

        let claims = json!(Token { exp, sub, purpose }).to_string();

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let encrypted = cipher.cbc_encrypt(&nonce, claims.as_bytes());
        //Encode data with nonce at the beginning
        general_purpose::URL_SAFE_NO_PAD.encode([&nonce, encrypted.as_slice()].concat())
    }

    /// Decode token and return its subject or an error
    pub fn decode(token: &str, purpose: TokenPurpose, cipher: &Cipher) -> Result<String, AppError> {
        let encrypted_decoded = general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| {
                warn!("Error decoding token : {e}");
                AppError::InvalidToken
            })?;
        if encrypted_decoded.len() <= NONCE_LEN || (encrypted_decoded.len() - NONCE_LEN) % 16 != 0
        {
            warn!("Token has a wrong length : {}", encrypted_decoded.len());
            return Err(AppError::InvalidToken);
        }
        let (nonce, datas) = encrypted_decoded.split_at(NONCE_LEN);
        let decrypted = cipher.cbc_decrypt(nonce, datas);
        let string_decrypted = String::from_utf8(decrypted).map_err(|e| {
            warn!("Error decrypting token : {e}");
            AppError::InvalidToken
        })?;

        let token: Token = serde_json::from_str(&string_decrypted).map_err(|e| {
            warn!("Error deserializing token : {e}");
            AppError::InvalidToken
        })?;
        if token.purpose != purpose {
            warn!(
                "Token for {:?} used as {:?}, subject {}",
                token.purpose, purpose, token.sub
            );
            return Err(AppError::InvalidToken);
        }
        if token.exp <= Utc::now().timestamp() {
            warn!(
                "Expired token {}, expire timestamp : {}",
                token.sub, token.exp
            );
            return Err(AppError::ExpiredToken);
        }

        Ok(token.sub)
    }
}
