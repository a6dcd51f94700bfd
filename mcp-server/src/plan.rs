/// Workflow returned by `make_stocks_plot_plan`.
pub const PLOT_PLAN: &str = "\
Follow this plan exactly to build the r/Stocks sentiment plot.

Step 1: Fetch posts
Call fetch_stocks_subreddit_posts to get the newest posts of the community.
The optional `limit` (1 to 100, default 25) sets how many posts are returned.

Step 2: Share first impressions
Tell the user what you see in the listing:
- Which stocks are mentioned, and how often?
- Is the tone around each stock optimistic or pessimistic, and why?
- What else would you need to read to judge this properly?

Step 3: Fetch the posts that matter
For every post that looks like it discusses specific stocks, call
fetch_single_reddit_post with its `id` or `permalink`. The result contains the
full text, score, upvote ratio, comment count and the top comments.
Prefer posts that name tickers or companies in the title, are discussions
rather than bare links, have real engagement, and carry opinions.

Step 4: Extract the data
Merge every mention of the same company into one entry (AAPL, Apple and
Apple Inc. all become 'Apple Inc. (AAPL)'). For each stock estimate:
- Sentiment: how positively it was discussed. -1.00 is very negative,
  0.00 neutral, 1.00 very positive. Weigh post text, comments, score and
  upvote ratio.
- Presence: how much it was discussed. 0.00 means barely mentioned,
  1.00 means it appears in nearly every post. Weigh mention frequency
  and engagement.
Two stocks should never sit on exactly the same spot; nudge the sentiment
by about 0.02 when they would.

Step 5: Show the data to the user
Before plotting, list every stock with its Symbol, Sentiment, Presence, a
short Summary of your reasoning, and Links to the posts that mention it.
The user must see the numbers before the chart is drawn.

Step 6: Create the plot
Call create_plot with `data`, a list of objects with these keys:
- 'Symbol' (required): company name with ticker in parentheses,
  e.g. 'Apple Inc. (AAPL)', 'Tesla Inc. (TSLA)'.
- 'Sentiment' (required): number from -1.00 to 1.00, precision 0.01 or better.
- 'Presence' (required): number from 0.00 to 1.00, precision 0.01 or better.
- 'Summary' (optional): up to 2000 characters explaining the values.
- 'Links' (optional): list of {'url', 'title'} objects, where 'url' is the
  post permalink (http or https) and 'title' the post title (1 to 200
  characters).
Values outside these ranges are rejected, not clamped; the error names the
offending record and field.
";

/// User message returned by the `make_r_stocks_plot` prompt.
pub const PLOT_PROMPT: &str = "Please create a sentiment plot for the posts of the r/Stocks \
subreddit. Start by calling 'make_stocks_plot_plan' to get the plan, and follow it before you \
create the plot.";
