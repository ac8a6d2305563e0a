use crate::error::{Parameter, ParameterMismatchError};
use crate::probe::AudioParameters;

/// Check that every input shares the parameters of the first one.
///
/// Inputs are `(name, parameters)` pairs in manifest order. Sample rate is
/// compared before channel count, and the first offending input is reported.
pub fn validate_parameters<S: AsRef<str>>(
    inputs: &[(S, AudioParameters)],
) -> Result<(), ParameterMismatchError> {
    let Some((_, reference)) = inputs.first() else {
        return Ok(());
    };

    for (name, parameters) in &inputs[1..] {
        let checks = [
            (
                Parameter::SampleRate,
                reference.sample_rate,
                parameters.sample_rate,
            ),
            (Parameter::Channels, reference.channels, parameters.channels),
        ];
        for (parameter, expected, actual) in checks {
            if expected != actual {
                return Err(ParameterMismatchError {
                    file: name.as_ref().to_owned(),
                    parameter,
                    expected,
                    actual,
                });
            }
        }
    }

    Ok(())
}
