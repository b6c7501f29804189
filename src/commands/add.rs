use crate::api::Mode;
use crate::args::{AddArgs, VehicleArg};
use crate::commands::{open, Out};
use crate::error::{Error, ErrorType};
use crate::form::{Form, FormInput, VehicleChoice};
use crate::model::Record;
use crate::session::Session;
use crate::{Config, Result};

/// Records one new cost for `user` through the form: the input is validated, the full record set
/// is loaded, the new record is appended and the whole set is written back.
///
/// # Returns
///
/// On success, returns an `Out` containing the saved record.
///
/// # Errors
///
/// - A `Request` error if `--pick` does not name a known vehicle.
/// - A `Validation` error if the vehicle is empty.
/// - A `Store` error if the sheet rejects the write, or if it holds rows that could not be parsed
///   and would be lost by the overwrite. Nothing is retried.
pub async fn add(config: Config, mode: Mode, user: &str, args: AddArgs) -> Result<Out<Record>> {
    let (mut store, mut session) = open(&config, mode, user).await?;
    let vehicle = vehicle_choice(&session, args.vehicle())?;
    let mut input = FormInput::new(vehicle, args.category(), args.amount()).with_note(args.note());
    input.date = args.date();

    let record = Form::new()
        .submit(&mut session, store.as_mut(), &input)
        .await?;
    let message = format!(
        "Saved {} for {} on {} ({}), your total is now {}",
        record.amount().chf(),
        record.vehicle(),
        record.date(),
        record.category(),
        session.summary().total().chf()
    );
    Ok(Out::new(message, record))
}

/// Resolves `--pick N` against the numbered list that `vcost vehicles` prints.
fn vehicle_choice(session: &Session, arg: VehicleArg) -> Result<VehicleChoice> {
    match arg {
        VehicleArg::Text(text) => Ok(VehicleChoice::Typed(text)),
        VehicleArg::Pick(n) => {
            let known = session.known_vehicles();
            n.checked_sub(1)
                .and_then(|ix| known.into_iter().nth(ix))
                .map(VehicleChoice::Known)
                .ok_or_else(|| {
                    Error::msg(
                        ErrorType::Request,
                        format!("There is no vehicle number {n}, see 'vcost vehicles'"),
                    )
                })
        }
    }
}
