use std::{borrow::Cow, io};

use crate::{
    Deserialize, Serialize,
    specs::{EvaluateRes, ParametersRes},
};

type Header = u32;
const HEADER_SIZE: usize = size_of::<Header>();

type Count = u64;
const COUNT_SIZE: usize = size_of::<Count>();

const ERR: Header = 0;
const CONTROL: Header = 1;
const FIT_INS: Header = 2;
const FIT_RES: Header = 3;

/// The payload data for the `Data` variant of the `Msg` enum.
///
/// Model blobs are opaque to this crate, an empty `FitIns` blob means the
/// coordinator has no global model to hand out yet.
#[derive(Debug, PartialEq)]
pub enum Payload<'a> {
    FitIns(&'a [u8]),
    FitRes { num_examples: u64, model: &'a [u8] },
}

/// The command for the `Control` variant of the `Msg` enum.
#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    GetParameters,
    Evaluate,
    Disconnect,
    ParametersRes(ParametersRes),
    EvaluateRes(EvaluateRes),
}

/// The application layer message for the entire system.
#[derive(Debug, PartialEq)]
pub enum Msg<'a> {
    Control(Command),
    Data(Payload<'a>),
    Err(Cow<'a, str>),
}

impl Msg<'_> {
    /// A short, stable name of the message kind, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Msg::Err(_) => "err",
            Msg::Control(Command::GetParameters) => "control/get_parameters",
            Msg::Control(Command::Evaluate) => "control/evaluate",
            Msg::Control(Command::Disconnect) => "control/disconnect",
            Msg::Control(Command::ParametersRes(_)) => "control/parameters_res",
            Msg::Control(Command::EvaluateRes(_)) => "control/evaluate_res",
            Msg::Data(Payload::FitIns(_)) => "data/fit_ins",
            Msg::Data(Payload::FitRes { .. }) => "data/fit_res",
        }
    }

    fn invalid_data<T>(text: String) -> io::Result<T> {
        Err(io::Error::new(io::ErrorKind::InvalidData, text))
    }
}

impl<'a> Serialize<'a> for Msg<'a> {
    fn serialize(&'a self, buf: &mut Vec<u8>) -> Option<&'a [u8]> {
        match self {
            Msg::Err(e) => {
                buf.extend_from_slice(&ERR.to_be_bytes());
                Some(e.as_bytes())
            }
            Msg::Control(cmd) => {
                buf.extend_from_slice(&CONTROL.to_be_bytes());

                // SAFETY: Serialize impl for `Command` is derived and not implemented
                //         by hand, its only map is keyed by strings.
                serde_json::to_writer(buf, cmd).unwrap();
                None
            }
            Msg::Data(Payload::FitIns(model)) => {
                buf.extend_from_slice(&FIT_INS.to_be_bytes());
                Some(model)
            }
            Msg::Data(Payload::FitRes {
                num_examples,
                model,
            }) => {
                buf.extend_from_slice(&FIT_RES.to_be_bytes());
                buf.extend_from_slice(&num_examples.to_be_bytes());
                Some(model)
            }
        }
    }
}

impl<'a> Deserialize<'a> for Msg<'a> {
    fn deserialize(buf: &'a [u8]) -> io::Result<Self> {
        let Some((kind_buf, rest)) = buf.split_first_chunk::<HEADER_SIZE>() else {
            return Self::invalid_data(format!(
                "the given buffer is too small {}, must at least be {HEADER_SIZE} bytes",
                buf.len()
            ));
        };

        match Header::from_be_bytes(*kind_buf) {
            ERR => {
                let text = std::str::from_utf8(rest)
                    .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

                Ok(Self::Err(Cow::Borrowed(text)))
            }
            CONTROL => {
                let cmd = serde_json::from_slice(rest)?;
                Ok(Self::Control(cmd))
            }
            FIT_INS => Ok(Self::Data(Payload::FitIns(rest))),
            FIT_RES => {
                let Some((count_buf, model)) = rest.split_first_chunk::<COUNT_SIZE>() else {
                    return Self::invalid_data(format!(
                        "fit result of {} bytes is missing its {COUNT_SIZE} bytes example count",
                        rest.len()
                    ));
                };

                Ok(Self::Data(Payload::FitRes {
                    num_examples: Count::from_be_bytes(*count_buf),
                    model,
                }))
            }
            kind => Self::invalid_data(format!("received an invalid kind header {kind}")),
        }
    }
}
