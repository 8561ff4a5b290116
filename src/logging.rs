use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

pub fn setup<Level>(verbosity: clap_verbosity_flag::Verbosity<Level>)
where
    Level: clap_verbosity_flag::LogLevel,
{
    let directive = tracing_subscriber::filter::Directive::from(verbosity.tracing_level_filter());
    let env_filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(directive);

    let subscriber = tracing_subscriber::registry::Registry::default().with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .with_filter(env_filter),
    );

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {err}");
    }
}
