mod calendar_tests;
mod pipeline_tests;
mod volatility_tests;
