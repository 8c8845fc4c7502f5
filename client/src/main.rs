use std::{io, sync::Arc};

use boosting::GbtEngine;
use clap::Parser;
use log::info;
use tokio::{net::TcpStream, signal};

use client::{
    Client, RoundConfig, Session,
    cli::Args,
    data::{DataPartition, DataSources, LabelMode, SplitConfig},
    error::ClientErr,
};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let sources = DataSources::for_node(&args.data_dir, args.node_id).map_err(ClientErr::from)?;
    let mode = if args.multi_class {
        LabelMode::MultiClass
    } else {
        LabelMode::Binary
    };
    let partition =
        DataPartition::load(&sources, mode, SplitConfig::default()).map_err(ClientErr::from)?;

    let config = RoundConfig::for_classes(partition.num_classes(), args.nthread, args.local_rounds);
    info!(
        node_id = args.node_id,
        classes = config.num_classes(),
        local_rounds = config.local_rounds();
        "using {} as evaluation metric",
        config.metric_label()
    );

    let client = Client::new(GbtEngine, Arc::new(config), Arc::new(partition));
    let session = Session::new(Arc::new(client));

    let stream = TcpStream::connect(&args.server_address).await?;
    let (rx, tx) = stream.into_split();
    let (rx, tx) = comms::channel(rx, tx);
    info!("connected to coordinator at {}", args.server_address);

    tokio::select! {
        ret = session.run(rx, tx) => {
            ret?;
            info!("wrapping up, disconnecting...");
        }
        _ = signal::ctrl_c() => {
            info!("received SIGTERM");
        }
    }

    Ok(())
}
