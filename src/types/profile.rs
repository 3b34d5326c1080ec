//! Account profile types
//!
//! A profile is everything the credential file tells us about one account:
//! the API application it was registered with, its phone number and the
//! device fingerprint the new session should present.

use serde::{Deserialize, Serialize};

/// Normalized credentials of one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    /// Telegram API application id
    pub api_id: i32,
    /// Telegram API application hash
    pub api_hash: String,
    /// Phone number, digits as found in the credential file
    pub phone: String,
    /// Two-step verification password
    pub two_fa: Option<String>,
    /// Device fingerprint for newly created sessions
    pub device: DeviceInfo,
}

/// Device fingerprint reported when a session is created.
///
/// Every field is optional; an absent field lets the transport pick its own
/// default instead of sending an empty or placeholder value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// OS / SDK version, e.g. `"Android 13"`
    pub system_version: Option<String>,
    /// Device model, e.g. `"SM-G991B"`
    pub device_model: Option<String>,
    /// Client application version
    pub app_version: Option<String>,
    /// Client language pack code
    pub lang_code: Option<String>,
    /// System language code
    pub system_lang_code: Option<String>,
}

impl AccountProfile {
    /// Create a profile with no optional data
    pub fn new(api_id: i32, api_hash: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            api_id,
            api_hash: api_hash.into(),
            phone: phone.into(),
            two_fa: None,
            device: DeviceInfo::default(),
        }
    }

    /// Attach a two-step verification password
    pub fn with_two_fa(mut self, password: impl Into<String>) -> Self {
        self.two_fa = Some(password.into());
        self
    }

    /// Attach a device fingerprint
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    /// Phone in international dialing form, as Telegram expects it
    pub fn dial_phone(&self) -> String {
        if self.phone.starts_with('+') {
            self.phone.clone()
        } else {
            format!("+{}", self.phone)
        }
    }
}

impl DeviceInfo {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.system_version.is_none()
            && self.device_model.is_none()
            && self.app_version.is_none()
            && self.lang_code.is_none()
            && self.system_lang_code.is_none()
    }
}
