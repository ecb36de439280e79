/// Absorbs a failed kernel read into its sentinel.
///
/// Accessors never escalate read faults: the fault is recorded at `trace`
/// level against the field that was being read and the caller receives
/// `None`, which it then maps to `0` or "no name".
pub trait ResultOkTraceExt<T, E> {
    fn ok_trace(self, field: &str) -> Option<T>;
}

impl<T, E> ResultOkTraceExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_trace(self, field: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::trace!(target: "cgroup_identity", "reading `{field}`: {err}");
                None
            }
        }
    }
}
