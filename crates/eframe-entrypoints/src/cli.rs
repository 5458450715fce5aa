use clap::Parser;

/// Parse the process command line into `T`
pub fn parse_args<T: Parser>() -> Result<T, clap::Error> {
    T::try_parse()
}
