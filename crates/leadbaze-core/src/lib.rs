pub mod app_config;
pub mod campaign;
pub mod config;
pub mod error;
pub mod export;
pub mod lead;
pub mod leads;
pub mod phone;
pub mod usage;

pub use app_config::{AppConfig, Environment};
pub use campaign::{format_elapsed, CampaignProgress, CampaignStatus, Performance};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use export::{leads_to_csv_string, write_leads_csv};
pub use lead::{Lead, LeadKey, LeadList, ListStatus, NewLeadList};
pub use leads::{
    dedupe_against, filter_leads, page_count, paginate, partition_by_phone, sort_leads,
    DedupOutcome, LeadCriteria, LeadPage, LeadSort, LeadTable, PhoneFilter, SortBy, SortOrder,
    WebsiteFilter,
};
pub use phone::{classify_phone, normalize_phone, PhoneKind};
pub use usage::{BillingPeriod, Quota, SubscriptionPlan, UsageCounters, UsageSnapshot};
