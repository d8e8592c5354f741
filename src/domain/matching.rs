//! Selection of the provider option that matches a watch.
//!
//! Options outside the requested fare class never match. When exact
//! departure times are requested, only options leaving at exactly those
//! times qualify and the first one wins; otherwise the cheapest option wins
//! (first one on ties).

use super::itinerary::Leg;
use super::quote::{FareOption, PriceQuote, QuotedLeg};
use crate::error::FetchError;

/// Pick the option matching `legs` and turn it into a quote.
///
/// Options whose leg count differs from `legs` are ignored.
pub fn select_option(options: &[FareOption], legs: &[Leg]) -> Result<PriceQuote, FetchError> {
    let shaped: Vec<&FareOption> = options
        .iter()
        .filter(|option| option.legs.len() == legs.len())
        .collect();
    if shaped.is_empty() {
        return Err(FetchError::EmptyResult);
    }

    let in_class: Vec<&FareOption> = shaped
        .iter()
        .copied()
        .filter(|option| fits_fare_class(option, legs))
        .collect();
    if in_class.is_empty() {
        let cheapest = cheapest(&shaped).map_or(0, |option| option.price);
        return Ok(PriceQuote::unmatched(cheapest, legs.len()));
    }

    let wants_exact_time = legs.iter().any(|leg| leg.departure_time.is_some());
    let chosen = if wants_exact_time {
        in_class
            .iter()
            .copied()
            .find(|option| fits_times(option, legs))
            .ok_or(FetchError::NoTimeMatch)?
    } else {
        cheapest(&in_class).ok_or(FetchError::EmptyResult)?
    };

    Ok(PriceQuote::matched(
        chosen.price,
        chosen.legs.iter().map(|leg| leg.bookable_ref.clone()).collect(),
    ))
}

fn fits_fare_class(option: &FareOption, legs: &[Leg]) -> bool {
    option.legs.iter().zip(legs).all(|(quoted, wanted)| {
        match (&wanted.fare_class, &quoted.fare_class) {
            (None, _) => true,
            (Some(want), Some(got)) => want.eq_ignore_ascii_case(got),
            (Some(_), None) => false,
        }
    })
}

fn fits_times(option: &FareOption, legs: &[Leg]) -> bool {
    option
        .legs
        .iter()
        .zip(legs)
        .all(|(quoted, wanted): (&QuotedLeg, &Leg)| match wanted.departure_time {
            None => true,
            Some(time) => quoted.departure_time == Some(time),
        })
}

fn cheapest<'a>(options: &[&'a FareOption]) -> Option<&'a FareOption> {
    options.iter().copied().fold(None, |best, option| match best {
        Some(current) if current.price <= option.price => Some(current),
        _ => Some(option),
    })
}
