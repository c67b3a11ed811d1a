// ABOUTME: Defines the DataRecord document served to the mobile app and its bill items.
// ABOUTME: Covers creation from request fields, partial updates, item removal, and the built-in default.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::error::ValidationError;

pub const DEFAULT_TH_RATE: f64 = 785.0;
pub const DEFAULT_MM_RATE: f64 = 760.0;
pub const DEFAULT_VERSION_CODE: i64 = 1;
pub const DEFAULT_TITLE: &str = "အပ်ဒိပ် အသစ်ရရှိပါပြီ";
pub const DEFAULT_MESSAGE: &str =
    "အက်ပ်၏ ဗားရှင်းအသစ်ကို ရနိုင်ပါပြီ။ ဆက်လုပ်ရန် ကျေးဇူးပြု၍ အပ်ဒိတ်လုပ်ပါ။";
pub const DEFAULT_LINK: &str = "https://play.google.com/store/apps/details?id=com.svpnmm.mmdev";
const DEFAULT_ITEMS: [(&str, &str); 2] = [("50฿", "5000Ks"), ("100฿", "10000ks")];

/// One THB bill to MMK bill mapping shown in the app's rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItem {
    #[serde(rename = "_id")]
    pub item_id: Ulid,
    pub thb_bill: String,
    pub mmk_bill: String,
}

impl BillItem {
    pub fn new(thb_bill: impl Into<String>, mmk_bill: impl Into<String>) -> Self {
        Self {
            item_id: Ulid::new(),
            thb_bill: thb_bill.into(),
            mmk_bill: mmk_bill.into(),
        }
    }
}

/// A bill item as submitted by a client. Items that already carry an `_id`
/// keep it; the rest are assigned a fresh one.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillItemInput {
    #[serde(rename = "_id", default)]
    pub item_id: Option<Ulid>,
    pub thb_bill: String,
    pub mmk_bill: String,
}

/// The rate/update-notice document. The store keeps at most one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataRecord {
    #[serde(rename = "_id")]
    pub record_id: Ulid,
    pub th_rate: f64,
    pub mm_rate: f64,
    pub version_code: i64,
    pub title: String,
    pub message: String,
    pub link: String,
    pub items: Vec<BillItem>,
}

/// Request body for creating a record. Every field except `items` is required.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFields {
    pub th_rate: f64,
    pub mm_rate: f64,
    pub version_code: i64,
    pub title: String,
    pub message: String,
    pub link: String,
    #[serde(default)]
    pub items: Vec<BillItemInput>,
}

/// Request body for updating a record. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUpdate {
    pub th_rate: Option<f64>,
    pub mm_rate: Option<f64>,
    pub version_code: Option<i64>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub link: Option<String>,
    pub items: Option<Vec<BillItemInput>>,
}

impl DataRecord {
    /// The baseline record created on first read of an empty store.
    pub fn default_record() -> Self {
        Self {
            record_id: Ulid::new(),
            th_rate: DEFAULT_TH_RATE,
            mm_rate: DEFAULT_MM_RATE,
            version_code: DEFAULT_VERSION_CODE,
            title: DEFAULT_TITLE.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
            link: DEFAULT_LINK.to_string(),
            items: DEFAULT_ITEMS
                .iter()
                .map(|(thb, mmk)| BillItem::new(*thb, *mmk))
                .collect(),
        }
    }

    /// Build a new record with a fresh id from validated request fields.
    pub fn from_fields(fields: DataFields) -> Result<Self, ValidationError> {
        require("title", &fields.title)?;
        require("message", &fields.message)?;
        require("link", &fields.link)?;
        let items = build_items(fields.items)?;

        Ok(Self {
            record_id: Ulid::new(),
            th_rate: fields.th_rate,
            mm_rate: fields.mm_rate,
            version_code: fields.version_code,
            title: fields.title,
            message: fields.message,
            link: fields.link,
            items,
        })
    }

    /// Replace every field present in `update`. Validation runs before any
    /// field is touched, so a rejected update leaves the record unchanged.
    pub fn apply(&mut self, update: DataUpdate) -> Result<(), ValidationError> {
        for (field, value) in [
            ("title", &update.title),
            ("message", &update.message),
            ("link", &update.link),
        ] {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        let items = update.items.map(build_items).transpose()?;

        if let Some(th_rate) = update.th_rate {
            self.th_rate = th_rate;
        }
        if let Some(mm_rate) = update.mm_rate {
            self.mm_rate = mm_rate;
        }
        if let Some(version_code) = update.version_code {
            self.version_code = version_code;
        }
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(link) = update.link {
            self.link = link;
        }
        if let Some(items) = items {
            self.items = items;
        }
        Ok(())
    }

    /// Drop the item with the given id. Returns whether anything was removed.
    pub fn remove_item(&mut self, item_id: &Ulid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.item_id != *item_id);
        self.items.len() != before
    }
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

fn build_items(inputs: Vec<BillItemInput>) -> Result<Vec<BillItem>, ValidationError> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            if input.thb_bill.is_empty() {
                return Err(ValidationError::MissingItemField {
                    index,
                    field: "thbBill",
                });
            }
            if input.mmk_bill.is_empty() {
                return Err(ValidationError::MissingItemField {
                    index,
                    field: "mmkBill",
                });
            }
            Ok(BillItem {
                item_id: input.item_id.unwrap_or_else(Ulid::new),
                thb_bill: input.thb_bill,
                mmk_bill: input.mmk_bill,
            })
        })
        .collect()
}
