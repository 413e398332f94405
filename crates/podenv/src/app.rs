use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("podenv")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Open a local shell with the environment a pod's containers would see")
        .long_about(
            "podenv resolves the environment variables declared by the containers of the \
             pods matching a label selector (inline declarations plus envFrom ConfigMap and \
             Secret references), then replaces the current process with an interactive shell \
             carrying the merged result. Your terminal, the pod's variables.",
        )
        .arg(
            Arg::new("selector")
                .long("selector")
                .short('l')
                .help("Label selector matching the target pods (e.g. app=web)")
                .required(true),
        )
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .short('n')
                .help("Namespace to search within")
                .default_value("default"),
        )
        .arg(
            Arg::new("kubeconfig")
                .long("kubeconfig")
                .help("Path to the kubeconfig file (defaults to ~/.kube/config)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue),
        )
}
