//! Credential file loader
//!
//! Reads the JSON file that accompanies each session. The layout follows the
//! format used by most account sellers:
//!
//! ```json
//! {
//!   "app_id": 2040,
//!   "app_hash": "b18441a1ff607e10a989891a5462e627",
//!   "phone": "15550001234",
//!   "twoFA": "optional password",
//!   "sdk": "Android 13",
//!   "device": "SM-G991B",
//!   "app_version": "10.3.1",
//!   "lang_pack": "en",
//!   "system_lang_pack": "en-US"
//! }
//! ```

use crate::{
    Error, Result,
    types::{
        AccountProfile, DeviceInfo,
        serde_helpers::{deserialize_optional_text, deserialize_phone},
    },
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CredentialFile {
    app_id: i32,
    app_hash: String,
    #[serde(deserialize_with = "deserialize_phone")]
    phone: String,
    #[serde(default, rename = "twoFA", deserialize_with = "deserialize_optional_text")]
    two_fa: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    sdk: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    device: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    app_version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    lang_pack: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    system_lang_pack: Option<String>,
}

impl From<CredentialFile> for AccountProfile {
    fn from(file: CredentialFile) -> Self {
        Self {
            api_id: file.app_id,
            api_hash: file.app_hash,
            phone: file.phone,
            two_fa: file.two_fa,
            device: DeviceInfo {
                system_version: file.sdk,
                device_model: file.device,
                app_version: file.app_version,
                lang_code: file.lang_pack,
                system_lang_code: file.system_lang_pack,
            },
        }
    }
}

/// Parse one credential file into an [`AccountProfile`].
///
/// Fails with [`Error::Parse`] if the file cannot be read, is not valid JSON,
/// or lacks `app_id`, `app_hash` or `phone`.
pub fn load(path: &Path) -> Result<AccountProfile> {
    let content =
        std::fs::read_to_string(path).map_err(|e| Error::parse(path, e.to_string()))?;
    parse(path, &content)
}

/// Parse credential JSON that was already read from `path`
pub fn parse(path: &Path, content: &str) -> Result<AccountProfile> {
    let file: CredentialFile =
        serde_json::from_str(content).map_err(|e| Error::parse(path, e.to_string()))?;

    if file.app_hash.trim().is_empty() {
        return Err(Error::parse(path, "app_hash is empty"));
    }

    let profile = AccountProfile::from(file);
    tracing::debug!(
        "Loaded credentials for {} (api_id {}) from {:?}",
        profile.phone,
        profile.api_id,
        path
    );
    Ok(profile)
}
