use anyhow::Result;
use clap::Parser;
use keyroute::config::Config;
use keyroute::configuration::Configuration;
use keyroute::dispatcher::Dispatcher;
use keyroute::mappings::EvdevToKeySym;
use keyroute::services::{create_input_listeners, LifecycleRequest, ProcessHost, SharedDispatcher};
use keyroute::utils;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "keyroute")]
#[command(about = "Горячие клавиши и маршрутизация групп по экранам для тайлингового WM")]
struct Args {
    /// Путь к файлу конфигурации
    #[arg(short, long, default_value = "keyroute.toml")]
    config: String,

    /// Режим сухого запуска: комбинации читаются из stdin, процессы не запускаются
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования (по умолчанию из [logging] конфигурации)
    #[arg(long)]
    log_level: Option<String>,

    /// Только проверить конфигурацию и вывести таблицу привязок
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Логирование настраивается из конфигурации, поэтому она читается первой
    let config = Config::load(&args.config)?;
    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    init_tracing(level, &config.logging.format)?;

    info!("Запуск keyroute v{}", env!("CARGO_PKG_VERSION"));
    info!("Конфигурация загружена из: {}", args.config);

    let configuration = Configuration::from_config(&config)?;
    warn_unreachable_keys(&configuration);

    if args.check {
        for line in configuration.summary() {
            println!("{}", line);
        }
        return Ok(());
    }

    if args.dry_run {
        warn!("Режим сухого запуска - процессы не запускаются, устройства не открываются");
    } else {
        utils::permissions::check_permissions(config.input.passthrough_unbound)?;
    }

    let (lifecycle_tx, mut lifecycle_rx) = mpsc::unbounded_channel();
    let host = ProcessHost::new(lifecycle_tx, config.input.drag_threshold_px, args.dry_run);
    let dispatcher: SharedDispatcher = Arc::new(Mutex::new(Dispatcher::new(
        Arc::new(configuration),
        host,
    )));

    let listeners = create_input_listeners(&config, dispatcher.clone(), args.dry_run)?;
    info!("Все компоненты инициализированы");

    let handles: Vec<_> = listeners
        .into_iter()
        .map(|listener| {
            let name = listener.name();
            tokio::spawn(async move {
                if let Err(e) = listener.run().await {
                    error!("Ошибка в {}: {}", name, e);
                }
            })
        })
        .collect();

    info!("Все сервисы запущены");

    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => error!("Ошибка при ожидании сигнала завершения: {}", err),
                }
                break;
            }
            request = lifecycle_rx.recv() => match request {
                Some(LifecycleRequest::Restart) => reload(&args.config, &dispatcher),
                Some(LifecycleRequest::Shutdown) | None => {
                    info!("Завершение по команде system.shutdown");
                    break;
                }
            },
        }
    }

    info!("Завершение работы...");

    // Прерываем задачи, чтобы гарантированно освободить grab в Drop
    for handle in &handles {
        handle.abort();
    }

    let shutdown_timeout = tokio::time::Duration::from_secs(5);
    let shutdown_result = tokio::time::timeout(shutdown_timeout, async {
        for handle in handles {
            let _ = handle.await;
        }
    })
    .await;

    match shutdown_result {
        Ok(_) => info!("Все сервисы завершили работу корректно"),
        Err(_) => warn!("Таймаут при завершении сервисов"),
    }

    info!("keyroute завершил работу");
    Ok(())
}

/// Перечитать файл и подменить конфигурацию; при ошибке остаётся прежняя
fn reload(config_path: &str, dispatcher: &SharedDispatcher) {
    info!("Перезагрузка конфигурации из {}", config_path);

    let configuration = match Config::load(config_path) {
        Ok(config) => Configuration::from_config(&config).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };

    match configuration {
        Ok(configuration) => {
            warn_unreachable_keys(&configuration);
            dispatcher.lock().reload(Arc::new(configuration));
            info!("Конфигурация перезагружена; настройки [input] применяются только при новом запуске");
        }
        Err(e) => error!("Перезагрузка не удалась, прежняя конфигурация сохранена: {:#}", e),
    }
}

/// Привязки к keysym, которых нет в раскладке evdev, никогда не сработают
fn warn_unreachable_keys(configuration: &Configuration) {
    for (chord, command) in configuration.bindings.sorted_keys() {
        if !EvdevToKeySym::is_known(&chord.key) {
            warn!(
                "Клавиша '{}' не встречается в evdev, привязка {} -> {} недостижима",
                chord.key, chord, command
            );
        }
    }
}

fn init_tracing(level: &str, format: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;

    let registry = tracing_subscriber::registry().with(filter);
    if format == "pretty" {
        registry.with(tracing_subscriber::fmt::layer().pretty()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().compact()).init();
    }

    Ok(())
}
