mod tio;
