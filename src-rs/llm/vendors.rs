//! Catalog of the LLM vendors the router knows how to reach.
//!
//! Model-hint routing is driven entirely by this table: a hint such as
//! `claude-3-opus` is matched against each vendor's prefixes, whether or not
//! that vendor has a credential configured. Adding a vendor means adding an
//! entry here plus an adapter in [`crate::helpers::build_adapter`].

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VendorSpec {
    /// Registry key, also reported in metrics and `activeProviders`.
    pub name: &'static str,
    pub display_name: &'static str,
    pub key_var: &'static str,
    pub base_url_var: &'static str,
    pub model_var: &'static str,
    pub default_base_url: &'static str,
    pub default_model: &'static str,
    pub model_prefixes: &'static [&'static str],
}

impl VendorSpec {
    pub fn matches_model(&self, model: &str) -> bool {
        self.model_prefixes.iter().any(|prefix| model.starts_with(prefix))
    }
}

pub const OPENAI: VendorSpec = VendorSpec {
    name: "openai",
    display_name: "OpenAI",
    key_var: "OPENAI_API_KEY",
    base_url_var: "OPENAI_BASE_URL",
    model_var: "OPENAI_MODEL",
    default_base_url: "https://api.openai.com",
    default_model: "gpt-4-turbo",
    model_prefixes: &["gpt"],
};

pub const ANTHROPIC: VendorSpec = VendorSpec {
    name: "anthropic",
    display_name: "Anthropic",
    key_var: "ANTHROPIC_API_KEY",
    base_url_var: "ANTHROPIC_BASE_URL",
    model_var: "ANTHROPIC_MODEL",
    default_base_url: "https://api.anthropic.com",
    default_model: "claude-3-5-sonnet-20241022",
    model_prefixes: &["claude"],
};

pub const GOOGLE: VendorSpec = VendorSpec {
    name: "google",
    display_name: "Google",
    key_var: "GOOGLE_API_KEY",
    base_url_var: "GOOGLE_BASE_URL",
    model_var: "GOOGLE_MODEL",
    default_base_url: "https://generativelanguage.googleapis.com",
    default_model: "gemini-pro",
    model_prefixes: &["gemini"],
};

/// Registration order; also the order random selection indexes into.
pub const KNOWN_VENDORS: &[VendorSpec] = &[OPENAI, ANTHROPIC, GOOGLE];

pub fn vendor_for_model(model: &str) -> Option<&'static VendorSpec> {
    KNOWN_VENDORS.iter().find(|vendor| vendor.matches_model(model))
}
