use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use futures::StreamExt;
use resonance_core::prelude::*;
use resonance_device::DeviceClient;
use resonance_kernel::{GestureBatch, SceneGraph};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn site_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .required(true)
        .value_parser(value_parser!(Site))
        .help(help)
}

fn rounds_arg() -> Arg {
    Arg::new("rounds")
        .long("rounds")
        .value_parser(value_parser!(u32))
        .help("Stop after this many rounds (default: until interrupted)")
}

fn cli() -> Command {
    Command::new("resonance")
        .version(resonance_core::VERSION)
        .about("Drive a Resonance game client over the device-control daemon")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .default_value("resonance.toml")
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file; missing means defaults"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(Command::new("scene").about("Recognize the scene on screen"))
        .subcommand(
            Command::new("route")
                .about("Print the shortest route between two scenes")
                .arg(Arg::new("from").required(true).help("Start scene name"))
                .arg(Arg::new("to").required(true).help("Target scene name")),
        )
        .subcommand(
            Command::new("screenshot")
                .about("Save a screenshot")
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .default_value("screenshot.png")
                        .value_parser(value_parser!(PathBuf))
                        .help("Where to write the PNG"),
                ),
        )
        .subcommand(
            Command::new("replay")
                .about("Replay a gesture script (`tap X Y` / `swipe X1 Y1 X2 Y2` per line)")
                .arg(
                    Arg::new("script")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Script file"),
                )
                .arg(
                    Arg::new("interval")
                        .long("interval")
                        .default_value("2500")
                        .value_parser(value_parser!(u64))
                        .help("Pause after each gesture, in milliseconds"),
                ),
        )
        .subcommand(
            Command::new("position")
                .about("Print the last touch position until interrupted")
                .arg(
                    Arg::new("every")
                        .long("every")
                        .default_value("500")
                        .value_parser(value_parser!(u64))
                        .help("Print period in milliseconds"),
                ),
        )
        .subcommand(
            Command::new("exchange")
                .about("Trade back and forth between two sites")
                .arg(site_arg("from", "First site"))
                .arg(
                    Arg::new("from-goods")
                        .required(true)
                        .value_delimiter(',')
                        .help("Goods to buy at the first site, comma separated"),
                )
                .arg(site_arg("to", "Second site"))
                .arg(
                    Arg::new("to-goods")
                        .required(true)
                        .value_delimiter(',')
                        .help("Goods to buy at the second site, comma separated"),
                )
                .arg(
                    Arg::new("buy-rounds")
                        .long("buy-rounds")
                        .default_value("0")
                        .value_parser(value_parser!(u32))
                        .help("Bargaining rounds when buying"),
                )
                .arg(
                    Arg::new("sell-rounds")
                        .long("sell-rounds")
                        .default_value("0")
                        .value_parser(value_parser!(u32))
                        .help("Price-raising rounds when selling"),
                )
                .arg(
                    Arg::new("extra")
                        .long("extra")
                        .default_value("0")
                        .value_parser(value_parser!(u32))
                        .help("Purchase books to use before each purchase"),
                )
                .arg(rounds_arg()),
        )
        .subcommand(
            Command::new("expulsion")
                .about("Repeat one expulsion board slot")
                .arg(site_arg("site", "Site with a security office"))
                .arg(
                    Arg::new("slot")
                        .required(true)
                        .value_parser(value_parser!(u8).range(1..=3))
                        .help("Board slot, 1 to 3"),
                )
                .arg(rounds_arg()),
        )
        .subcommand(
            Command::new("orders")
                .about("Accept every order on a guild board")
                .arg(
                    Arg::new("site")
                        .long("site")
                        .value_parser(value_parser!(Site))
                        .help("Guild to use (default: the site on screen)"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Cancel on Ctrl-C
fn cancel_on_interrupt(signal: CancelSignal) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, stopping");
            signal.cancel();
        }
    });
}

fn task_from(name: &str, args: &ArgMatches) -> Result<Task> {
    let task = match name {
        "exchange" => {
            let buy_rounds = *args.get_one::<u32>("buy-rounds").context("buy-rounds")?;
            let sell_rounds = *args.get_one::<u32>("sell-rounds").context("sell-rounds")?;
            let extra = *args.get_one::<u32>("extra").context("extra")?;
            let leg = |site: &str, goods: &str| -> Result<TradeLeg> {
                let site = *args.get_one::<Site>(site).context("site")?;
                let goods = args.get_many::<String>(goods).context("goods")?.cloned();
                Ok(TradeLeg::new(site, goods)
                    .with_rounds(buy_rounds, sell_rounds)
                    .with_extra(extra))
            };
            let mut task = ExchangeTask::new(leg("from", "from-goods")?, leg("to", "to-goods")?);
            task.rounds = args.get_one::<u32>("rounds").copied();
            Task::Exchange(task)
        }
        "expulsion" => {
            let site = *args.get_one::<Site>("site").context("site")?;
            let slot = *args.get_one::<u8>("slot").context("slot")?;
            let mut task = ExpulsionTask::new(site, slot);
            task.rounds = args.get_one::<u32>("rounds").copied();
            Task::Expulsion(task)
        }
        "orders" => Task::Orders(OrderTask {
            site: args.get_one::<Site>("site").copied(),
        }),
        other => bail!("not a task: {other}"),
    };
    Ok(task)
}

async fn run_task(runner: &TaskRunner, task: Task) -> Result<()> {
    runner.start(task)?;
    match runner.wait().await {
        Some(Ok(report)) => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        Some(Err(e)) if e.is_cancellation() => {
            warn!("Task cancelled");
            Ok(())
        }
        Some(Err(e)) => Err(e.into()),
        None => Ok(()),
    }
}

async fn watch_position(config: &ResonanceConfig, every: Duration) -> Result<()> {
    let mut client = DeviceClient::new(config.device.clone());
    client.connect().await?;
    let events = client.stream_input_events().await?;
    let position = events.position();

    let printer = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let sample = position.load();
            println!("x={} y={}", sample.x, sample.y);
        }
    });

    let mut samples = Box::pin(events.into_stream());
    let outcome = tokio::select! {
        result = async {
            while let Some(sample) = samples.next().await {
                sample?;
            }
            Ok::<_, resonance_device::DeviceError>(())
        } => result.map_err(anyhow::Error::from),
        _ = tokio::signal::ctrl_c() => Ok(()),
    };
    printer.abort();
    outcome
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json"));

    let path = matches
        .get_one::<PathBuf>("config")
        .context("config path")?;
    let config = ResonanceConfig::load(path)?;

    let Some((name, args)) = matches.subcommand() else {
        bail!("no subcommand");
    };

    if name == "route" {
        let graph = SceneGraph::standard()?;
        let from = args.get_one::<String>("from").context("from")?;
        let to = args.get_one::<String>("to").context("to")?;
        let start = graph
            .find(from)
            .with_context(|| format!("unknown scene {from}"))?;
        let target = graph.find(to).with_context(|| format!("unknown scene {to}"))?;
        let path = graph
            .shortest_path(start, target)
            .with_context(|| format!("no route from {from} to {to}"))?;
        for id in path {
            println!("{}", graph.scene(id).name);
        }
        return Ok(());
    }

    if name == "position" {
        let every = Duration::from_millis(*args.get_one::<u64>("every").context("every")?);
        return watch_position(&config, every).await;
    }

    let runner = TaskRunner::from_config(config)?;
    cancel_on_interrupt(runner.cancel_signal().clone());

    match name {
        "scene" => {
            let mut session = runner.session();
            let result = session.detect_scene().await;
            session.shutdown().await?;
            println!("{}", runner.graph().scene(result?).name);
        }
        "screenshot" => {
            let output = args.get_one::<PathBuf>("output").context("output")?;
            let mut session = runner.session();
            let png = session.executor_mut().screenshot().await;
            session.shutdown().await?;
            std::fs::write(output, png?)
                .with_context(|| format!("writing {}", output.display()))?;
            info!("Saved {}", output.display());
        }
        "replay" => {
            let script = args.get_one::<PathBuf>("script").context("script")?;
            let interval = Duration::from_millis(*args.get_one::<u64>("interval").context("interval")?);
            let batch: GestureBatch = std::fs::read_to_string(script)
                .with_context(|| format!("reading {}", script.display()))?
                .parse()?;
            let mut session = runner.session();
            let result = session.executor_mut().execute(&batch, interval).await;
            session.shutdown().await?;
            result?;
        }
        task => run_task(&runner, task_from(task, args)?).await?,
    }
    Ok(())
}
