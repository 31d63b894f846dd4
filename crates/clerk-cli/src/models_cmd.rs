use clerk_core::registry::ProviderRegistry;

pub fn run(registry: &ProviderRegistry) {
    print!("{}", render(registry));
}

fn render(registry: &ProviderRegistry) -> String {
    let width = registry
        .entries()
        .map(|(model, _)| model.len())
        .max()
        .unwrap_or(0);
    let mut output = String::new();
    for (model, provider) in registry.entries() {
        output.push_str(&format!("{model:<width$}  {provider}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::render;
    use clerk_core::registry::ProviderRegistry;

    #[test]
    fn render_lists_models_sorted_and_aligned() {
        let registry = ProviderRegistry::from_entries([
            ("model-b", "vendor2"),
            ("gpt-4o", "openai"),
        ]);
        assert_eq!(render(&registry), "gpt-4o   openai\nmodel-b  vendor2\n");
    }

    #[test]
    fn render_includes_builtin_models() {
        let output = render(&ProviderRegistry::builtin());
        assert!(output.contains("gpt-oss-20b"));
        assert!(output.contains("anthropic"));
    }
}
