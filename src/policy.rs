//! Content policy: which tags, attributes and URL schemes survive sanitization
//!
//! A [`ContentPolicy`] is built once at startup and then only read, so one
//! value can be shared by reference across any number of concurrent pipeline
//! runs.
//!
//! # Precedence
//!
//! Deny entries always win over allow entries:
//!
//! 1. A tag in `forbidden_tags` is removed even if it is also allowed
//! 2. An attribute in `forbidden_attributes` is dropped even if a wildcard
//!    rule such as `data-*` would admit it
//! 3. Attributes starting with `on` are dropped no matter what the policy
//!    says (enforced by the sanitizer, not configurable)
//!
//! # Examples
//!
//! ```rust
//! use html_rebaser::policy::{ContentPolicy, ElementVerdict};
//!
//! let policy = ContentPolicy::default()
//!     .allow_tags(["custom-card"])
//!     .allow_tag_attributes("custom-card", ["variant"]);
//!
//! assert_eq!(policy.check_element("custom-card"), ElementVerdict::Keep);
//! assert_eq!(policy.check_element("script"), ElementVerdict::Remove);
//! assert!(policy.is_attribute_allowed("custom-card", "variant"));
//! assert!(policy.is_attribute_allowed("div", "data-anything"));
//! ```

use std::collections::{HashMap, HashSet};

/// Default maximum nesting depth; deeper subtrees are removed
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Attribute the rebaser uses to mark rewritten navigation links
pub const INTERNAL_LINK_ATTRIBUTE: &str = "data-rebased-link";

/// Tags that are removed together with their whole subtree
const DEFAULT_FORBIDDEN_TAGS: &[&str] = &[
    "script",    // JavaScript execution
    "noscript",  // Parsed differently with scripting disabled (mXSS)
    "iframe",    // Embeds an arbitrary origin
    "frame",     // Embeds an arbitrary origin
    "frameset",  // Embeds an arbitrary origin
    "object",    // Plugin execution
    "embed",     // Plugin execution
    "applet",    // Legacy Java applets
    "form",      // Submission to an uncontrolled endpoint
    "template",  // Inert content that script could activate
    "svg",       // Foreign content with its own script and event model
    "math",      // Foreign content, namespace confusion
    "noembed",   // Raw-text parsing differentials
    "noframes",  // Raw-text parsing differentials
    "xmp",       // Raw-text parsing differentials
    "plaintext", // Swallows the rest of the document
    "portal",    // Embeds an arbitrary origin
    "dialog",    // Modal top-layer content
];

const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    // Document structure
    "html", "head", "body", "title", "meta", "link", "base", "style",
    // Sectioning and grouping
    "article", "aside", "footer", "header", "hgroup", "main", "nav", "section",
    "address", "blockquote", "div", "dl", "dt", "dd", "figure", "figcaption",
    "hr", "li", "ol", "ul", "menu", "p", "pre", "details", "summary",
    "h1", "h2", "h3", "h4", "h5", "h6",
    // Text-level
    "a", "abbr", "b", "bdi", "bdo", "br", "cite", "code", "data", "dfn", "em",
    "i", "kbd", "mark", "q", "rp", "rt", "ruby", "s", "samp", "small", "span",
    "strong", "sub", "sup", "time", "u", "var", "wbr", "del", "ins",
    // Tables
    "table", "caption", "colgroup", "col", "tbody", "thead", "tfoot", "tr",
    "td", "th",
    // Media
    "img", "picture", "source", "video", "audio", "track", "map", "area",
    // Inert form controls
    "input", "button", "select", "option", "optgroup", "textarea", "label",
    "fieldset", "legend", "output", "progress", "meter",
    // Legacy presentational
    "center", "font", "big", "tt", "strike", "nobr",
];

/// Attributes admitted on every element
const DEFAULT_GENERIC_ATTRIBUTES: &[&str] = &[
    "id", "class", "title", "lang", "dir", "style", "hidden", "role",
    "translate", "align", "valign", "width", "height", "bgcolor", "background",
    "aria-*", "data-*",
];

const DEFAULT_TAG_ATTRIBUTES: &[(&str, &[&str])] = &[
    ("a", &["href", "name", "rel", "hreflang", "type", "download"]),
    ("area", &["href", "alt", "coords", "shape", "rel", "hreflang"]),
    ("base", &["href"]),
    ("link", &["href", "rel", "type", "media", "sizes", "hreflang", "as"]),
    ("meta", &["name", "content", "charset", "property", "itemprop"]),
    ("img", &["src", "srcset", "sizes", "alt", "loading", "decoding", "usemap", "border", "hspace", "vspace"]),
    ("source", &["src", "srcset", "sizes", "media", "type"]),
    ("picture", &[]),
    ("video", &["src", "poster", "controls", "autoplay", "loop", "muted", "playsinline", "preload"]),
    ("audio", &["src", "controls", "autoplay", "loop", "muted", "preload"]),
    ("track", &["src", "kind", "srclang", "label", "default"]),
    ("map", &["name"]),
    ("blockquote", &["cite"]),
    ("q", &["cite"]),
    ("del", &["cite", "datetime"]),
    ("ins", &["cite", "datetime"]),
    ("time", &["datetime"]),
    ("data", &["value"]),
    ("ol", &["start", "reversed", "type"]),
    ("ul", &["type"]),
    ("li", &["value", "type"]),
    ("table", &["border", "cellpadding", "cellspacing", "summary", "frame", "rules"]),
    ("col", &["span"]),
    ("colgroup", &["span"]),
    ("td", &["colspan", "rowspan", "headers", "nowrap"]),
    ("th", &["colspan", "rowspan", "headers", "scope", "abbr", "nowrap"]),
    ("details", &["open"]),
    ("input", &["type", "name", "value", "placeholder", "checked", "disabled", "readonly", "size", "maxlength"]),
    ("button", &["type", "name", "value", "disabled"]),
    ("select", &["name", "multiple", "disabled", "size"]),
    ("option", &["value", "selected", "disabled", "label"]),
    ("optgroup", &["label", "disabled"]),
    ("textarea", &["name", "rows", "cols", "placeholder", "disabled", "readonly", "wrap"]),
    ("label", &["for"]),
    ("fieldset", &["disabled", "name"]),
    ("output", &["for", "name"]),
    ("progress", &["value", "max"]),
    ("meter", &["value", "min", "max", "low", "high", "optimum"]),
    ("font", &["color", "face", "size"]),
    ("bdo", &["dir"]),
];

const DEFAULT_FORBIDDEN_ATTRIBUTES: &[&str] = &[
    "http-equiv", // meta refresh navigates without script
    "action",
    "formaction",
    "formtarget",
    "target", // can navigate the embedding context
    "ping",
    "srcdoc",
    INTERNAL_LINK_ATTRIBUTE,
];

const DEFAULT_DANGEROUS_SCHEMES: &[&str] = &[
    "javascript", // JavaScript execution
    "vbscript",   // VBScript execution (legacy IE)
    "data",       // Inline documents; allowed only on explicit targets
    "file",       // Local file access
    "about",      // Browser internal URLs
    "blob",       // Object URLs minted by script
    "filesystem", // Sandboxed filesystem URLs
];

/// (tag, attribute) pairs that may carry `data:` URLs
const DEFAULT_DATA_URL_TARGETS: &[(&str, &str)] =
    &[("img", "src"), ("img", "srcset"), ("source", "srcset")];

/// Attributes whose values are URLs and are checked against the scheme list
const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "srcset", "poster", "background", "cite", "action",
    "formaction", "longdesc", "usemap", "manifest", "codebase", "data",
    "xlink:href", "lowsrc", "dynsrc", "profile", "ping", "icon",
];

/// What to do with an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementVerdict {
    /// Keep the element and sanitize its attributes and children
    Keep,
    /// Remove the element and all of its descendants
    Remove,
}

/// An allow-list entry for attribute names
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeRule {
    /// Matches exactly this (lowercase) name
    Exact(String),
    /// Matches any name starting with this prefix; written `prefix*`
    Prefix(String),
}

impl AttributeRule {
    /// Parse a rule, treating a trailing `*` as a prefix wildcard
    pub fn parse(rule: &str) -> Self {
        let rule = rule.to_ascii_lowercase();
        match rule.strip_suffix('*') {
            Some(prefix) => AttributeRule::Prefix(prefix.to_string()),
            None => AttributeRule::Exact(rule),
        }
    }

    /// Check whether a lowercase attribute name matches this rule
    pub fn matches(&self, name: &str) -> bool {
        match self {
            AttributeRule::Exact(exact) => exact == name,
            AttributeRule::Prefix(prefix) => {
                name.len() > prefix.len() && name.starts_with(prefix.as_str())
            }
        }
    }
}

/// Allow/deny configuration for the sanitizer
#[derive(Debug, Clone)]
pub struct ContentPolicy {
    allowed_tags: HashSet<String>,
    forbidden_tags: HashSet<String>,
    generic_attributes: Vec<AttributeRule>,
    tag_attributes: HashMap<String, Vec<AttributeRule>>,
    forbidden_attributes: HashSet<String>,
    dangerous_schemes: HashSet<String>,
    data_url_targets: HashSet<(String, String)>,
    url_attributes: HashSet<String>,
    strip_comments: bool,
    max_depth: usize,
}

impl ContentPolicy {
    /// A policy that allows nothing
    ///
    /// Useful as a starting point for a strict allow-list. Event handlers and
    /// the URL attribute list still apply.
    pub fn empty() -> Self {
        Self {
            allowed_tags: HashSet::new(),
            forbidden_tags: HashSet::new(),
            generic_attributes: Vec::new(),
            tag_attributes: HashMap::new(),
            forbidden_attributes: HashSet::new(),
            dangerous_schemes: HashSet::new(),
            data_url_targets: HashSet::new(),
            url_attributes: lowercase_set(URL_ATTRIBUTES.iter().copied()),
            strip_comments: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Permit tags
    ///
    /// Naming a tag here also lifts an earlier `forbid_tags` entry for it,
    /// so opting into a default-forbidden tag (such as `form`) is explicit.
    pub fn allow_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref().to_ascii_lowercase();
            self.forbidden_tags.remove(&tag);
            self.allowed_tags.insert(tag);
        }
        self
    }

    /// Deny tags; deny entries win over allow entries
    pub fn forbid_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.forbidden_tags
            .extend(tags.into_iter().map(|t| t.as_ref().to_ascii_lowercase()));
        self
    }

    /// Permit attributes on every element; `prefix*` rules are wildcards
    pub fn allow_attributes<I, S>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.generic_attributes
            .extend(rules.into_iter().map(|r| AttributeRule::parse(r.as_ref())));
        self
    }

    /// Permit attributes on one element
    pub fn allow_tag_attributes<I, S>(mut self, tag: &str, rules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tag_attributes
            .entry(tag.to_ascii_lowercase())
            .or_default()
            .extend(rules.into_iter().map(|r| AttributeRule::parse(r.as_ref())));
        self
    }

    /// Deny attributes on every element
    pub fn forbid_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.forbidden_attributes
            .extend(names.into_iter().map(|n| n.as_ref().to_ascii_lowercase()));
        self
    }

    /// Add URL schemes (without the trailing `:`) that must never survive
    pub fn add_dangerous_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.dangerous_schemes.extend(
            schemes
                .into_iter()
                .map(|s| s.as_ref().trim_end_matches(':').to_ascii_lowercase()),
        );
        self
    }

    /// Permit `data:` URLs in one attribute of one element
    pub fn allow_data_urls(mut self, tag: &str, attribute: &str) -> Self {
        self.data_url_targets
            .insert((tag.to_ascii_lowercase(), attribute.to_ascii_lowercase()));
        self
    }

    /// Whether comment nodes are removed
    pub fn strip_comments(mut self, strip: bool) -> Self {
        self.strip_comments = strip;
        self
    }

    /// Maximum element nesting depth; deeper subtrees are removed
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decide whether an element survives
    pub fn check_element(&self, tag: &str) -> ElementVerdict {
        let tag = tag.to_ascii_lowercase();
        if self.forbidden_tags.contains(&tag) || !self.allowed_tags.contains(&tag) {
            ElementVerdict::Remove
        } else {
            ElementVerdict::Keep
        }
    }

    /// Check an attribute name against the allow and deny lists
    ///
    /// The value is not inspected; the sanitizer checks URL schemes separately.
    pub fn is_attribute_allowed(&self, tag: &str, name: &str) -> bool {
        let tag = tag.to_ascii_lowercase();
        let name = name.to_ascii_lowercase();
        if self.forbidden_attributes.contains(&name) {
            return false;
        }
        let tag_rules = self.tag_attributes.get(&tag).map(Vec::as_slice).unwrap_or_default();
        self.generic_attributes
            .iter()
            .chain(tag_rules)
            .any(|rule| rule.matches(&name))
    }

    /// Whether the attribute is on the deny list
    pub fn forbids_attribute(&self, name: &str) -> bool {
        self.forbidden_attributes.contains(&name.to_ascii_lowercase())
    }

    /// Whether the attribute carries a URL that is checked against schemes
    pub fn is_url_attribute(&self, name: &str) -> bool {
        self.url_attributes.contains(&name.to_ascii_lowercase())
    }

    /// Check a scheme (lowercase, without `:`) for one attribute of one tag
    pub fn is_scheme_dangerous(&self, tag: &str, attribute: &str, scheme: &str) -> bool {
        if !self.dangerous_schemes.contains(scheme) {
            return false;
        }
        if scheme == "data" {
            let target = (tag.to_ascii_lowercase(), attribute.to_ascii_lowercase());
            return !self.data_url_targets.contains(&target);
        }
        true
    }

    /// Whether comment nodes are removed
    pub fn strips_comments(&self) -> bool {
        self.strip_comments
    }

    /// Maximum element nesting depth
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

impl Default for ContentPolicy {
    fn default() -> Self {
        let mut policy = ContentPolicy::empty()
            .allow_tags(DEFAULT_ALLOWED_TAGS)
            .forbid_tags(DEFAULT_FORBIDDEN_TAGS)
            .allow_attributes(DEFAULT_GENERIC_ATTRIBUTES)
            .forbid_attributes(DEFAULT_FORBIDDEN_ATTRIBUTES)
            .add_dangerous_schemes(DEFAULT_DANGEROUS_SCHEMES);
        for (tag, attributes) in DEFAULT_TAG_ATTRIBUTES {
            policy = policy.allow_tag_attributes(tag, attributes.iter());
        }
        for (tag, attribute) in DEFAULT_DATA_URL_TARGETS {
            policy = policy.allow_data_urls(tag, attribute);
        }
        policy
    }
}

fn lowercase_set<'a>(items: impl Iterator<Item = &'a str>) -> HashSet<String> {
    items.map(str::to_ascii_lowercase).collect()
}
