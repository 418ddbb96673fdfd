/// Compile-time build metadata produced by `build.rs`.
#[derive(Debug, Clone, Copy)]
pub struct BuildMetadata {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildMetadata {
    /// One-line summary used by `quick_money_cli version`.
    pub fn summary(&self) -> String {
        format!(
            "quick_money {} ({}, {} build, {})",
            self.version, self.git_hash, self.profile, self.timestamp
        )
    }
}

/// Returns the statically-embedded build metadata.
pub fn current() -> BuildMetadata {
    BuildMetadata {
        version: env!("CARGO_PKG_VERSION"),
        git_hash: option_env!("QUICK_MONEY_BUILD_HASH").unwrap_or("unknown"),
        timestamp: option_env!("QUICK_MONEY_BUILD_TIMESTAMP").unwrap_or("unknown"),
        profile: option_env!("QUICK_MONEY_BUILD_PROFILE").unwrap_or("unknown"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn summary_mentions_package_version() {
        let meta = super::current();
        assert!(meta.summary().contains(env!("CARGO_PKG_VERSION")));
    }
}
