//! Token-to-descriptor resolution.

use std::sync::Arc;

use katamari_types::CommandNotFound;

use crate::descriptor::CommandDescriptor;
use crate::registry::CommandRegistry;

/// Resolves raw command tokens against a registry snapshot.
///
/// Resolution is a pure function of the token and the snapshot: a miss is
/// final for that snapshot and is never retried or defaulted.
#[derive(Debug, Clone)]
pub struct Resolver {
    registry: Arc<CommandRegistry>,
}

impl Resolver {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Resolve `token` to the descriptor bound to it.
    ///
    /// The token is normalized with the registry's policy; the failure keeps
    /// the original token for user-facing messages.
    pub fn resolve(&self, token: &str) -> Result<Arc<CommandDescriptor>, CommandNotFound> {
        let result = self.registry.lookup(token);
        match &result {
            Ok(d) if d.name() != token => log::trace!("Resolved {token:?} to {}", d.name()),
            Ok(_) => {},
            Err(_) => log::debug!("No command bound to {token:?}"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CommandOutput;
    use katamari_types::NameMatch;

    fn resolver(policy: NameMatch) -> Resolver {
        let mut reg = CommandRegistry::with_policy(policy);
        reg.register(
            CommandDescriptor::builder("build")
                .aliases(["b", "compile"])
                .build_fn(|_, _| Ok(CommandOutput::None))
                .unwrap(),
        )
        .unwrap();
        Resolver::new(Arc::new(reg))
    }

    #[test]
    fn canonical_and_aliases_identical() {
        let r = resolver(NameMatch::Exact);
        let d = r.resolve("build").unwrap();
        assert!(Arc::ptr_eq(&d, &r.resolve("b").unwrap()));
        assert!(Arc::ptr_eq(&d, &r.resolve("compile").unwrap()));
    }

    #[test]
    fn miss_carries_exact_token() {
        let r = resolver(NameMatch::Exact);
        for token in ["deploy", " Deploy ", "BUILD", "", "   "] {
            let err = r.resolve(token).unwrap_err();
            assert_eq!(err.name(), token);
        }
    }

    #[test]
    fn surrounding_whitespace_trimmed() {
        let r = resolver(NameMatch::Exact);
        assert_eq!(r.resolve("  b\n").unwrap().name(), "build");
    }

    #[test]
    fn case_insensitive_resolution() {
        let r = resolver(NameMatch::CaseInsensitive);
        assert_eq!(r.resolve("Compile").unwrap().name(), "build");
        let err = r.resolve("Deploy").unwrap_err();
        assert_eq!(err.name(), "Deploy");
    }

    #[test]
    fn resolve_has_no_side_effects() {
        let r = resolver(NameMatch::Exact);
        let _ = r.resolve("missing");
        let _ = r.resolve("build");
        assert_eq!(r.registry().len(), 1);
        assert!(r.resolve("missing").is_err());
    }
}
