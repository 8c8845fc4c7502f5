use std::{num::NonZeroUsize, sync::Arc};

use boosting::{Dataset, GbtEngine};
use client::{Client, ClientErr, RoundConfig, Session, data::DataPartition};
use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
};
use tokio::io::{self, DuplexStream, ReadHalf, WriteHalf};

type Channel = (
    OnoReceiver<ReadHalf<DuplexStream>>,
    OnoSender<WriteHalf<DuplexStream>>,
);

fn channel_pair() -> (Channel, Channel) {
    let (stream1, stream2) = io::duplex(4096);
    let (rx1, tx1) = io::split(stream1);
    let (rx2, tx2) = io::split(stream2);
    (comms::channel(rx1, tx1), comms::channel(rx2, tx2))
}

fn dataset(rows: std::ops::Range<usize>) -> Dataset {
    let mut data = Vec::new();
    let mut labels = Vec::new();

    for i in rows {
        let a = (i % 17) as f32;
        let b = ((i * 7) % 13) as f32;
        data.extend([a, b]);
        labels.push(if a + b > 14.0 { 1.0 } else { 0.0 });
    }

    Dataset::from_rows(data, 2, labels).unwrap()
}

fn session() -> Session<GbtEngine> {
    let partition = DataPartition::new(dataset(0..200), dataset(200..290));
    let config = RoundConfig::for_classes(2, 2, NonZeroUsize::MIN);
    let client = Client::new(GbtEngine, Arc::new(config), Arc::new(partition));
    Session::new(Arc::new(client))
}

#[tokio::test]
async fn serves_a_full_round() -> io::Result<()> {
    let ((mut co_rx, mut co_tx), (cl_rx, cl_tx)) = channel_pair();
    let session = session();

    let client_fut = async move { session.run(cl_rx, cl_tx).await.map_err(io::Error::from) };
    let coordinator_fut = async move {
        let mut rx_buf = Vec::new();

        co_tx.send(&Msg::Control(Command::GetParameters)).await?;
        let Msg::Control(Command::ParametersRes(res)) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("expected parameters");
        };
        assert!(res.status.is_ok());
        assert!(res.parameters.is_empty());

        co_tx.send(&Msg::Control(Command::Evaluate)).await?;
        let Msg::Err(detail) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("evaluate before fit must be rejected");
        };
        assert!(detail.contains("before any fit"));

        co_tx.send(&Msg::Data(Payload::FitIns(&[]))).await?;
        let Msg::Data(Payload::FitRes {
            num_examples,
            model,
        }) = co_rx.recv_into(&mut rx_buf).await?
        else {
            panic!("expected a fit result");
        };
        assert_eq!(num_examples, 200);
        assert!(!model.is_empty());
        let global = model.to_vec();

        co_tx
            .send(&Msg::Data(Payload::FitIns(b"garbage")))
            .await?;
        let Msg::Err(_) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("a malformed model must be rejected");
        };

        co_tx.send(&Msg::Data(Payload::FitIns(&global))).await?;
        let Msg::Data(Payload::FitRes { num_examples, .. }) = co_rx.recv_into(&mut rx_buf).await?
        else {
            panic!("expected a fit result");
        };
        assert_eq!(num_examples, 200);

        co_tx.send(&Msg::Control(Command::Evaluate)).await?;
        let Msg::Control(Command::EvaluateRes(res)) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("expected an evaluation");
        };
        assert!(res.status.is_ok());
        assert_eq!(res.num_examples, 90);
        assert_eq!(res.loss, 0.0);
        let auc = res.metrics["AUC"];
        assert!((0.0..=1.0).contains(&auc));

        co_tx.send(&Msg::Control(Command::Disconnect)).await?;
        let Msg::Control(Command::Disconnect) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("expected the disconnect echo");
        };

        Ok::<_, io::Error>(())
    };

    tokio::try_join!(client_fut, coordinator_fut)?;
    Ok(())
}

#[tokio::test]
async fn coordinator_errors_do_not_end_the_session() -> io::Result<()> {
    let ((mut co_rx, mut co_tx), (cl_rx, cl_tx)) = channel_pair();
    let session = session();

    let client_fut = async move { session.run(cl_rx, cl_tx).await.map_err(io::Error::from) };
    let coordinator_fut = async move {
        let mut rx_buf = Vec::new();

        co_tx.send(&Msg::Err("round aborted".into())).await?;
        co_tx.send(&Msg::Control(Command::Disconnect)).await?;

        let Msg::Control(Command::Disconnect) = co_rx.recv_into(&mut rx_buf).await? else {
            panic!("expected the disconnect echo");
        };
        Ok::<_, io::Error>(())
    };

    tokio::try_join!(client_fut, coordinator_fut)?;
    Ok(())
}

#[tokio::test]
async fn unexpected_messages_end_the_session() {
    let ((_co_rx, mut co_tx), (cl_rx, cl_tx)) = channel_pair();

    let msg = Msg::Data(Payload::FitRes {
        num_examples: 1,
        model: b"{}",
    });
    co_tx.send(&msg).await.unwrap();

    let err = session().run(cl_rx, cl_tx).await.unwrap_err();
    assert!(matches!(
        err,
        ClientErr::UnexpectedMessage {
            got: "data/fit_res"
        }
    ));
}
