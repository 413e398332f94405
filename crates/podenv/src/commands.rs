use std::path::PathBuf;

use clap::ArgMatches;
use tracing::info;

use podenv_core::{cluster, launch, resolve};

/// One resolve-then-exec cycle. Returns the exit code to terminate with when
/// the launcher runs in child-process mode; in replacement mode a successful
/// launch never returns here.
pub fn run(matches: &ArgMatches) -> Result<i32, Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_cycle(matches))
}

async fn run_cycle(matches: &ArgMatches) -> Result<i32, Box<dyn std::error::Error>> {
    let selector = matches
        .get_one::<String>("selector")
        .map(String::as_str)
        .unwrap_or_default();
    let namespace = matches
        .get_one::<String>("namespace")
        .map(String::as_str)
        .unwrap_or("default");
    let kubeconfig = kubeconfig_path(matches)?;

    let client = cluster::build_client(&kubeconfig).await?;
    let pods = cluster::list_pods(client.clone(), namespace, selector).await?;

    let fetcher = cluster::KubeFetcher::new(client, namespace);
    let env = resolve::resolve_environment(&pods, &fetcher, selector, namespace).await?;

    eprintln!("Opening shell with environment: {}", env.keys().join(", "));
    info!(
        event = "cli.shell_opening",
        selector = selector,
        namespace = namespace,
        variables = env.len()
    );

    let code = launch::launch_shell(&env).await?;
    Ok(code)
}

fn kubeconfig_path(matches: &ArgMatches) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if let Some(path) = matches.get_one::<String>("kubeconfig") {
        return Ok(PathBuf::from(path));
    }
    match dirs::home_dir() {
        Some(home) => Ok(home.join(".kube").join("config")),
        None => Err("could not determine a home directory; pass --kubeconfig explicitly".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::build_cli;

    #[test]
    fn test_kubeconfig_flag_overrides_default_location() {
        let matches = build_cli()
            .try_get_matches_from(["podenv", "-l", "app=web", "--kubeconfig", "/tmp/kc"])
            .expect("flags should parse");
        let path = kubeconfig_path(&matches).expect("explicit path needs no home dir");
        assert_eq!(path, PathBuf::from("/tmp/kc"));
    }

    #[test]
    fn test_kubeconfig_defaults_under_home() {
        let matches = build_cli()
            .try_get_matches_from(["podenv", "-l", "app=web"])
            .expect("selector alone should parse");
        if let Some(home) = dirs::home_dir() {
            let path = kubeconfig_path(&matches).expect("home dir is present");
            assert_eq!(path, home.join(".kube").join("config"));
        }
    }
}
