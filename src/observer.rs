use crate::errors::ObservableErr;

/// The three notifications an observable can deliver.
///
/// `error` and `complete` are terminal; they default to no-ops so an implementor
/// only writes the handlers it cares about.
pub trait Observer {
    type NextFnType;

    fn next(&mut self, _: Self::NextFnType);

    fn error(&mut self, _: ObservableErr) {}

    fn complete(&mut self) {}
}
