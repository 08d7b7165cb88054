//! Sensitive-data category and token models

use serde::{Deserialize, Serialize};

/// Sensitive-data category for CI/CD pipeline metadata
///
/// The category set is closed per deployment but extended through the
/// pattern table: a new category needs a variant here plus data rows in
/// the TOML rule file, never a new code path in the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Pipeline names (display names, full project names)
    PipelineName,
    /// Job names
    JobName,
    /// Git branch names and refs
    BranchName,
    /// Repository names and clone URLs
    RepositoryName,
    /// Organization names
    OrganizationName,
    /// Folder names in the CI tree
    FolderName,
    /// Kubernetes/cloud cluster names
    ClusterName,
    /// Application names
    AppName,
    /// Service names
    ServiceName,
    /// Kubernetes namespaces
    Namespace,
    /// Deployment environment names
    Environment,
    /// Team/group names
    TeamName,
    /// Usernames, committers, build triggers
    UserName,
    /// Company names
    CompanyName,
    /// Build node/agent names
    NodeName,
    /// File and workspace paths
    FilePath,
    /// Credential-like material (passwords, tokens, API keys)
    Credential,
    /// Email addresses
    Email,
    /// IP addresses
    IpAddress,
    /// URLs
    Url,
    /// Fallback for ambiguous matches under strict mode
    Redacted,
}

impl Category {
    /// Token prefix for this category (`<PREFIX>_<digest>`)
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::PipelineName => "PIPELINE",
            Self::JobName => "JOB",
            Self::BranchName => "BRANCH",
            Self::RepositoryName => "REPO",
            Self::OrganizationName => "ORG",
            Self::FolderName => "FOLDER",
            Self::ClusterName => "CLUSTER",
            Self::AppName => "APP",
            Self::ServiceName => "SERVICE",
            Self::Namespace => "NAMESPACE",
            Self::Environment => "ENVIRONMENT",
            Self::TeamName => "TEAM",
            Self::UserName => "USER",
            Self::CompanyName => "COMPANY",
            Self::NodeName => "NODE",
            Self::FilePath => "FILE_PATH",
            Self::Credential => "CREDENTIAL",
            Self::Email => "EMAIL",
            Self::IpAddress => "IP",
            Self::Url => "URL",
            Self::Redacted => "REDACTED",
        }
    }

    /// All categories, in a stable order
    pub fn all() -> &'static [Category] {
        &[
            Self::PipelineName,
            Self::JobName,
            Self::BranchName,
            Self::RepositoryName,
            Self::OrganizationName,
            Self::FolderName,
            Self::ClusterName,
            Self::AppName,
            Self::ServiceName,
            Self::Namespace,
            Self::Environment,
            Self::TeamName,
            Self::UserName,
            Self::CompanyName,
            Self::NodeName,
            Self::FilePath,
            Self::Credential,
            Self::Email,
            Self::IpAddress,
            Self::Url,
            Self::Redacted,
        ]
    }

    /// Parse a category label as it appears in the pattern table
    pub fn parse(s: &str) -> Option<Category> {
        match s.to_uppercase().as_str() {
            "PIPELINE" | "PIPELINE_NAME" => Some(Self::PipelineName),
            "JOB" | "JOB_NAME" => Some(Self::JobName),
            "BRANCH" | "BRANCH_NAME" => Some(Self::BranchName),
            "REPO" | "REPOSITORY" | "REPO_NAME" => Some(Self::RepositoryName),
            "ORG" | "ORGANIZATION" => Some(Self::OrganizationName),
            "FOLDER" | "FOLDER_NAME" => Some(Self::FolderName),
            "CLUSTER" | "CLUSTER_NAME" => Some(Self::ClusterName),
            "APP" | "APP_NAME" | "APPLICATION" => Some(Self::AppName),
            "SERVICE" | "SERVICE_NAME" => Some(Self::ServiceName),
            "NAMESPACE" => Some(Self::Namespace),
            "ENVIRONMENT" | "ENV" => Some(Self::Environment),
            "TEAM" | "TEAM_NAME" => Some(Self::TeamName),
            "USER" | "USER_NAME" | "USERNAME" => Some(Self::UserName),
            "COMPANY" | "COMPANY_NAME" => Some(Self::CompanyName),
            "NODE" | "NODE_NAME" | "AGENT" => Some(Self::NodeName),
            "FILE_PATH" | "PATH" => Some(Self::FilePath),
            "CREDENTIAL" | "SECRET" => Some(Self::Credential),
            "EMAIL" => Some(Self::Email),
            "IP" | "IP_ADDRESS" => Some(Self::IpAddress),
            "URL" => Some(Self::Url),
            "REDACTED" => Some(Self::Redacted),
            _ => None,
        }
    }
}

/// Category-prefixed stand-in for a sensitive value
///
/// Two tokens are equal iff their category and digest are equal. The digest
/// may carry a `-N` disambiguation suffix after collision handling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    /// Category this token was minted under
    pub category: Category,
    /// Fixed-width salted digest, plus optional `-N` suffix
    pub digest: String,
}

impl Token {
    /// Create a token from a category and digest
    pub fn new(category: Category, digest: impl Into<String>) -> Self {
        Self {
            category,
            digest: digest.into(),
        }
    }

    /// Render the wire form, e.g. `BRANCH_9f8e7d1a2b3c`
    pub fn render(&self) -> String {
        format!("{}_{}", self.category.prefix(), self.digest)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.category.prefix(), self.digest)
    }
}

/// Core regex pattern matching any rendered token at the given digest width
///
/// Prefixes are alternated longest-first so no prefix shadows another.
/// Callers anchor it (`^...$`) for whole-value checks or wrap it in word
/// boundaries for scanning response text.
pub fn token_pattern(digest_width: usize) -> String {
    let mut prefixes: Vec<&str> = Category::all().iter().map(|c| c.prefix()).collect();
    prefixes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    format!(
        "(?:{})_[0-9a-f]{{{digest_width}}}(?:-[0-9]+)?",
        prefixes.join("|")
    )
}

/// One original-value/token pairing recorded during a round trip
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationEntry {
    /// Category the value was classified under
    pub category: Category,
    /// The original sensitive value (never leaves the local process)
    pub original: String,
    /// The minted token
    pub token: Token,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("BRANCH", Category::BranchName)]
    #[test_case("branch_name", Category::BranchName)]
    #[test_case("CREDENTIAL", Category::Credential)]
    #[test_case("FILE_PATH", Category::FilePath)]
    #[test_case("ip", Category::IpAddress)]
    fn test_parse_category(label: &str, expected: Category) {
        assert_eq!(Category::parse(label), Some(expected));
    }

    #[test]
    fn test_parse_unknown_category() {
        assert_eq!(Category::parse("NOT_A_CATEGORY"), None);
    }

    #[test]
    fn test_prefixes_are_unique() {
        let mut prefixes: Vec<_> = Category::all().iter().map(|c| c.prefix()).collect();
        prefixes.sort_unstable();
        prefixes.dedup();
        assert_eq!(prefixes.len(), Category::all().len());
    }

    #[test]
    fn test_token_render() {
        let token = Token::new(Category::BranchName, "9f8e7d1a2b3c");
        assert_eq!(token.render(), "BRANCH_9f8e7d1a2b3c");
        assert_eq!(token.to_string(), "BRANCH_9f8e7d1a2b3c");
    }

    #[test]
    fn test_token_equality() {
        let a = Token::new(Category::PipelineName, "abc123");
        let b = Token::new(Category::PipelineName, "abc123");
        let c = Token::new(Category::JobName, "abc123");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
