use std::{
    ffi::OsString,
    io::{self, Write},
};

use clap::{error::ErrorKind as ClapErrorKind, Parser};
use color_eyre::{eyre::WrapErr, Result};
use log::debug;

use crate::{
    cli::{Args, CommandOptions},
    config::Config,
    error::{Error, ErrorKind},
    identity::WebhookIdentity,
    payload::{self, Input, Stdin},
    render,
    stoat::{ApiResponse, Client},
};

/// Error kind for a command line clap refused; `None` for help and version.
fn usage_kind(kind: ClapErrorKind) -> Option<ErrorKind> {
    match kind {
        ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => None,
        ClapErrorKind::UnknownArgument | ClapErrorKind::InvalidSubcommand => {
            Some(ErrorKind::UnknownOption)
        }
        ClapErrorKind::InvalidValue
        | ClapErrorKind::NoEquals
        | ClapErrorKind::TooFewValues
        | ClapErrorKind::WrongNumberOfValues => Some(ErrorKind::MissingValue),
        _ => Some(ErrorKind::Usage),
    }
}

/// Run one invocation and return the process exit code.
pub fn run<I, T>(argv: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    debug!("parsing arguments");
    let args = match Args::try_parse_from(argv) {
        Ok(args) => args,
        Err(err) => {
            err.print().wrap_err("Failed to print usage")?;
            return Ok(usage_kind(err.kind()).map_or(0, ErrorKind::exit_code));
        }
    };

    let config = Config::load()?;
    let client = Client::new(&config);
    let (target, options) = args.command.into_parts();

    match execute(&client, &target, &options, &mut Stdin) {
        Ok(response) => {
            debug!("rendering {} response ({})", options.name(), response.status);
            let mut stdout = io::stdout().lock();
            render::success(&mut stdout, &options, &response)
                .and_then(|_| stdout.flush())
                .wrap_err("Failed to write to stdout")?;
            if args.debug {
                render::body(&mut io::stderr().lock(), &response.body)?;
            }
            Ok(0)
        }
        Err(err) => {
            debug!("{} failed: {:?}", options.name(), err.kind());
            render::failure(&mut io::stderr().lock(), &err, args.debug)?;
            Ok(err.kind().exit_code())
        }
    }
}

fn execute(
    client: &Client,
    target: &[String],
    options: &CommandOptions,
    input: &mut dyn Input,
) -> Result<ApiResponse, Error> {
    debug!("resolving webhook identity");
    let identity = WebhookIdentity::resolve(target)?;
    debug!("building {} request", options.name());
    let request = payload::build(options, input)?;
    debug!("calling api");
    Ok(client.execute(&identity, request)?)
}
